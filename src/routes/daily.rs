//! 今日のコーデ（プレミアム）

use super::{parse_id, required, ApiResponse, ApiResult};
use crate::auth::PremiumUser;
use crate::models::{DailyOutfitRecord, EventRef, OutfitRecord};
use crate::services::daily::{self, DailyRequest, DailyResult};
use crate::state::AppState;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stylo_ai_common::Mood;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    user_mood: Option<String>,
    city: Option<String>,
    #[serde(default)]
    calendar_events: Vec<EventRef>,
    #[serde(default)]
    regenerate: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkWornRequest {
    daily_outfit_id: Option<String>,
    rating: Option<u8>,
    notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TodayView {
    daily_outfit: DailyOutfitRecord,
    outfit: Option<OutfitRecord>,
}

async fn generate(
    State(state): State<Arc<AppState>>,
    PremiumUser(user): PremiumUser,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<DailyResult> {
    let request = DailyRequest {
        mood: req.user_mood.as_deref().and_then(Mood::parse_lenient),
        city: req.city,
        calendar_events: req.calendar_events,
        regenerate: req.regenerate,
    };

    let result = daily::generate_today(&state, user.id, request, Utc::now()).await?;
    let message = result.message.clone();
    Ok(ApiResponse::ok(result).message(message))
}

async fn today(State(state): State<Arc<AppState>>, PremiumUser(user): PremiumUser) -> ApiResult<Option<TodayView>> {
    let view = daily::today(&state, user.id, Utc::now())
        .await
        .map(|(daily_outfit, outfit)| TodayView { daily_outfit, outfit });

    Ok(match view {
        Some(view) => ApiResponse::ok(Some(view)),
        None => ApiResponse::ok(None).message("No outfit generated for today"),
    })
}

async fn mark_worn(
    State(state): State<Arc<AppState>>,
    PremiumUser(user): PremiumUser,
    Json(req): Json<MarkWornRequest>,
) -> ApiResult<DailyOutfitRecord> {
    let daily_id = required(req.daily_outfit_id, "Daily outfit ID is required")?;
    let daily_id = parse_id(&daily_id, "Daily outfit")?;

    let record = daily::mark_worn(&state, user.id, daily_id, req.rating, req.notes, Utc::now()).await?;
    Ok(ApiResponse::ok(record).message("Outfit marked as worn"))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate))
        .route("/today", get(today))
        .route("/mark-worn", post(mark_worn))
}
