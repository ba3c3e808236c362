//! 週間プラン（プレミアム）

use super::{parse_date, parse_id, required, ApiResponse, ApiResult};
use crate::auth::PremiumUser;
use crate::error::StyloError;
use crate::models::PlannerRecord;
use crate::services::planner::{self, WeekPlan, WeekRequest};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    week_start_date: Option<String>,
    city: Option<String>,
    #[serde(default)]
    regenerate: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeekQuery {
    week_start_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmRequest {
    planner_id: Option<String>,
    date: Option<String>,
    outfit_id: Option<String>,
}

async fn generate(
    State(state): State<Arc<AppState>>,
    PremiumUser(user): PremiumUser,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<WeekPlan> {
    let week_start = required(req.week_start_date, "Week start date is required")?;
    let request = WeekRequest {
        week_start: parse_date(&week_start)?,
        city: req.city,
        regenerate: req.regenerate,
    };

    let plan = planner::generate_week(&state, user.id, request, Utc::now()).await?;
    Ok(ApiResponse::ok(plan).message("Weekly plan generated successfully"))
}

async fn weekly(
    State(state): State<Arc<AppState>>,
    PremiumUser(user): PremiumUser,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Option<WeekPlan>> {
    let week_start = required(query.week_start_date, "Week start date is required")?;
    let week_start = parse_date(&week_start)?;

    Ok(match planner::get_week(&state, user.id, week_start).await {
        Some(plan) => ApiResponse::ok(Some(plan)),
        None => ApiResponse::ok(None).message("No plan found for this week"),
    })
}

async fn confirm(
    State(state): State<Arc<AppState>>,
    PremiumUser(user): PremiumUser,
    Json(req): Json<ConfirmRequest>,
) -> ApiResult<PlannerRecord> {
    const MISSING: &str = "Planner ID, date, and outfit ID are required";
    let (planner_id, date, outfit_id) = match (req.planner_id, req.date, req.outfit_id) {
        (Some(p), Some(d), Some(o)) if !p.is_empty() && !d.is_empty() && !o.is_empty() => (p, d, o),
        _ => return Err(StyloError::Validation(MISSING.into())),
    };

    let planner = planner::confirm(
        &state,
        user.id,
        parse_id(&planner_id, "Planner")?,
        parse_date(&date)?,
        parse_id(&outfit_id, "Outfit")?,
        Utc::now(),
    )
    .await?;
    Ok(ApiResponse::ok(planner).message("Outfit confirmed for the day"))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate))
        .route("/weekly", get(weekly))
        .route("/confirm", post(confirm))
}
