//! 不足アイテム検出（プレミアム）

use super::{parse_id, required, ApiResponse, ApiResult};
use crate::auth::PremiumUser;
use crate::models::GapReport;
use crate::services::gaps;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveRequest {
    gap_id: Option<String>,
}

async fn detect(State(state): State<Arc<AppState>>, PremiumUser(user): PremiumUser) -> ApiResult<GapReport> {
    let report = state
        .store
        .write(|db| gaps::detect(db, user.id, Utc::now()))
        .await?;
    Ok(ApiResponse::ok(report).message("Gap analysis completed"))
}

async fn latest(State(state): State<Arc<AppState>>, PremiumUser(user): PremiumUser) -> ApiResult<Option<GapReport>> {
    let report = state.store.read(|db| gaps::latest(db, user.id)).await;
    Ok(match report {
        Some(report) => ApiResponse::ok(Some(report)),
        None => ApiResponse::ok(None).message("No gap analysis found"),
    })
}

async fn resolve(
    State(state): State<Arc<AppState>>,
    PremiumUser(user): PremiumUser,
    Json(req): Json<ResolveRequest>,
) -> ApiResult<GapReport> {
    let gap_id = required(req.gap_id, "Gap ID is required")?;
    let gap_id = parse_id(&gap_id, "Gap analysis")?;

    let report = state
        .store
        .write(|db| gaps::resolve(db, user.id, gap_id, Utc::now()))
        .await?;
    Ok(ApiResponse::ok(report).message("Gap marked as resolved"))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(latest))
        .route("/detect", post(detect))
        .route("/resolve", post(resolve))
}
