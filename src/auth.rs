//! 認証
//!
//! - パスワード: argon2
//! - アクセストークン: HS256 JWT（`sub` = ユーザーID）
//! - カレンダー連携の `state`: 用途付きの短命JWT
//! - `AuthUser` / `PremiumUser` エクストラクタ

use crate::error::{Result, StyloError};
use crate::models::User;
use crate::state::AppState;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 6;

const CALENDAR_STATE_PURPOSE: &str = "calendar";
const CALENDAR_STATE_MINUTES: i64 = 15;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    purpose: Option<String>,
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StyloError::Internal(format!("password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

fn sign(user_id: Uuid, secret: &str, lifetime: Duration, purpose: Option<&str>) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
        purpose: purpose.map(String::from),
    };
    Ok(encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))?)
}

fn verify(token: &str, secret: &str, purpose: Option<&str>) -> Result<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    if data.claims.purpose.as_deref() != purpose {
        return Err(StyloError::Unauthorized("Not authorized, token failed".into()));
    }

    Uuid::parse_str(&data.claims.sub)
        .map_err(|_| StyloError::Unauthorized("Not authorized, token failed".into()))
}

pub fn issue_token(user_id: Uuid, secret: &str, expiry_days: i64) -> Result<String> {
    sign(user_id, secret, Duration::days(expiry_days), None)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Uuid> {
    verify(token, secret, None)
}

/// OAuth の `state` に載せる短命トークン
pub fn issue_calendar_state(user_id: Uuid, secret: &str) -> Result<String> {
    sign(
        user_id,
        secret,
        Duration::minutes(CALENDAR_STATE_MINUTES),
        Some(CALENDAR_STATE_PURPOSE),
    )
}

pub fn decode_calendar_state(state: &str, secret: &str) -> Result<Uuid> {
    verify(state, secret, Some(CALENDAR_STATE_PURPOSE))
}

/// 認証済みユーザー
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// プレミアム会員（有効期限内）
#[derive(Debug, Clone)]
pub struct PremiumUser(pub User);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = StyloError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self> {
        let token = bearer_token(parts)
            .ok_or_else(|| StyloError::Unauthorized("Not authorized, no token".into()))?;
        let user_id = decode_token(token, &state.config.jwt_secret)?;

        let user = state
            .store
            .read(|db| db.user(user_id).cloned())
            .await
            .ok_or_else(|| StyloError::Unauthorized("Not authorized, user not found".into()))?;

        Ok(AuthUser(user))
    }
}

impl FromRequestParts<Arc<AppState>> for PremiumUser {
    type Rejection = StyloError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.premium_active(Utc::now()) {
            tracing::debug!(user_id = %user.id, "premium feature requested by free user");
            return Err(StyloError::PremiumRequired);
        }

        Ok(PremiumUser(user))
    }
}
