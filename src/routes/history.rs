//! スタイル履歴

use super::{parse_date, parse_id, required, ApiResponse, ApiResult};
use crate::auth::AuthUser;
use crate::models::{StyleHistoryRecord, StylePhoto};
use crate::services::history::{self, ProgressReport, TrackRequest};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackBody {
    outfit_id: Option<String>,
    worn_date: Option<String>,
    rating: Option<u8>,
    feedback: Option<String>,
    #[serde(default)]
    photos: Vec<StylePhoto>,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn track(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(body): Json<TrackBody>,
) -> ApiResult<StyleHistoryRecord> {
    let outfit_id = required(body.outfit_id, "Outfit ID is required")?;
    let now = Utc::now();
    let worn_date = match body.worn_date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(d) => parse_date(d)?,
        None => now.date_naive(),
    };

    let request = TrackRequest {
        outfit_id: parse_id(&outfit_id, "Outfit")?,
        worn_date,
        rating: body.rating,
        feedback: body.feedback,
        photos: body.photos,
    };

    let record = state
        .store
        .write(|db| history::track(db, user.id, request, now))
        .await?;
    Ok(ApiResponse::ok(record).message("Outfit tracked successfully").created())
}

async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<StyleHistoryRecord>> {
    let records = state.store.read(|db| history::list(db, user.id, query.limit)).await;
    Ok(ApiResponse::ok(records))
}

async fn progress(State(state): State<Arc<AppState>>, AuthUser(user): AuthUser) -> ApiResult<ProgressReport> {
    let report = state.store.read(|db| history::progress(db, user.id)).await;
    Ok(ApiResponse::ok(report))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/track", post(track))
        .route("/history", get(list))
        .route("/progress", get(progress))
}
