//! HTTP ルーティング
//!
//! すべてのAPIは `{"success": bool, "data"?: ..., "message"?: ...}` で応答する。
//! エラー時の本文は [`StyloError`] の `IntoResponse` を参照。

mod account;
mod analysis;
mod calendar;
mod config;
mod daily;
mod gaps;
mod history;
mod occasions;
mod outfits;
mod payment;
mod planner;
mod wardrobe;

use crate::error::{Result, StyloError};
use crate::state::AppState;
use crate::uploads::MAX_UPLOAD_BYTES;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// 共通レスポンス
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            status: StatusCode::OK,
        }
    }

    /// 業務上の失敗（HTTP 200 のまま `success: false`）
    pub fn failed(message: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: Some(data),
            status: StatusCode::OK,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn created(mut self) -> Self {
        self.status = StatusCode::CREATED;
        self
    }
}

impl ApiResponse<()> {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>>;

/// 必須項目の取り出し（空文字も未指定扱い）
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StyloError::Validation(message.to_string()))
}

/// `YYYY-MM-DD` または RFC3339 の日時から日付を取り出す
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| StyloError::Validation(format!("Invalid date: {}", value)))
}

pub(crate) fn parse_id(value: &str, what: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(value.trim()).map_err(|_| StyloError::NotFound(format!("{} not found", what)))
}

/// multipart フォーム（画像1枚 + テキスト項目）
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub image: Option<Vec<u8>>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| StyloError::Validation(format!("Invalid form data: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| StyloError::Validation(format!("Invalid image upload: {}", e)))?;
                form.image = Some(bytes.to_vec());
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| StyloError::Validation(format!("Invalid form data: {}", e)))?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }

    pub fn take_image(&mut self) -> Result<Vec<u8>> {
        self.image
            .take()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| StyloError::Validation("No image file provided".into()))
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// 画像アップロード用の本文上限（画像上限 + フォーム項目の余裕）
pub(crate) fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "message": "StyloAI API is running", "status": "ok" }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
}

/// 全APIのルーター
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", account::auth_routes())
        .nest("/api/profile", account::profile_routes())
        .nest("/api/analysis", analysis::routes())
        .nest("/api/wardrobe", wardrobe::routes())
        .nest("/api/outfits", outfits::routes())
        .nest("/api/daily-outfit", daily::routes())
        .nest("/api/planner", planner::routes())
        .nest("/api/gaps", gaps::routes())
        .nest("/api/occasions", occasions::routes())
        .nest("/api/style-history", history::routes())
        .nest("/api/calendar", calendar::routes())
        .nest("/api/payment", payment::routes())
        .nest("/api/config", config::routes())
        .fallback(not_found)
        .with_state(state)
}
