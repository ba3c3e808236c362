//! 外部連携の設定状況

use super::{ApiResponse, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;

async fn check(State(state): State<Arc<AppState>>) -> ApiResult<Value> {
    let google = &state.config.google_calendar;
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());

    Ok(ApiResponse::ok(json!({
        "googleCalendar": {
            "configured": google.is_configured(),
            "hasClientId": present(&google.client_id),
            "hasClientSecret": present(&google.client_secret),
            "hasRedirectUri": present(&google.redirect_uri),
        },
        "phonePe": { "configured": state.phonepe.is_configured() },
        "weather": { "configured": state.weather.is_configured() },
        "aws": { "configured": state.vision.is_enabled() },
        "cloudinary": { "configured": state.config.cloudinary.is_configured() },
    })))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/check", get(check))
}
