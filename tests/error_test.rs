//! エラーケーステスト
//!
//! StyloError のステータス・レスポンス本文・変換を検証

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;
use stylo_ai::error::StyloError;

async fn body_of(err: StyloError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// エラー本文は `success: false` とメッセージ
#[tokio::test]
async fn test_error_body_shape() {
    let (status, body) = body_of(StyloError::NotFound("Outfit not found".into())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Outfit not found");
    assert!(body.get("isPremium").is_none());
}

/// プレミアム必須は isPremium: false を付ける
#[tokio::test]
async fn test_premium_required_body() {
    let (status, body) = body_of(StyloError::PremiumRequired).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["isPremium"], false);
    assert_eq!(body["message"], "Premium subscription required for this feature");
}

#[test]
fn test_status_codes() {
    let cases = vec![
        (StyloError::Validation("x".into()), StatusCode::BAD_REQUEST),
        (StyloError::InvalidImage("x".into()), StatusCode::BAD_REQUEST),
        (StyloError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
        (StyloError::NotFound("x".into()), StatusCode::NOT_FOUND),
        (StyloError::Conflict("x".into()), StatusCode::CONFLICT),
        (StyloError::NotConfigured("PhonePe".into()), StatusCode::SERVICE_UNAVAILABLE),
        (StyloError::Upstream("x".into()), StatusCode::BAD_GATEWAY),
        (StyloError::CliExecution("x".into()), StatusCode::BAD_GATEWAY),
        (StyloError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        (StyloError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, expected) in cases {
        assert_eq!(err.status(), expected, "{:?}", err);
    }
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: StyloError = io_err.into();

    assert!(matches!(err, StyloError::Io(_)));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(err.to_string().contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<Value>("{ invalid }").unwrap_err();
    let err: StyloError = json_err.into();

    assert!(matches!(err, StyloError::Json(_)));
}

/// ドメインエラーはメッセージをそのまま返す
#[test]
fn test_domain_error_transparent() {
    let err: StyloError = stylo_ai_common::Error::InvalidOccasion("Picnic".into()).into();

    assert!(matches!(err, StyloError::Domain(_)));
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "Invalid occasion: Picnic");
}

/// 不正なJWTは 401
#[test]
fn test_token_error_is_unauthorized() {
    let jwt_err = jsonwebtoken::decode::<Value>(
        "not.a.token",
        &jsonwebtoken::DecodingKey::from_secret(b"secret"),
        &jsonwebtoken::Validation::default(),
    )
    .unwrap_err();
    let err: StyloError = jwt_err.into();

    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}
