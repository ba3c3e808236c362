//! コーデ生成・履歴

use super::{parse_id, ApiResponse, ApiResult};
use crate::auth::AuthUser;
use crate::error::{Result, StyloError};
use crate::models::OutfitRecord;
use crate::services::outfits;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stylo_ai_common::{Occasion, StyleType};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    style_type: Option<String>,
    occasion: Option<String>,
    weather: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    #[serde(default)]
    saved_only: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutfitList {
    outfits: Vec<OutfitRecord>,
    count: usize,
}

pub(crate) fn parse_style(value: Option<&str>) -> Result<StyleType> {
    value
        .map(str::trim)
        .unwrap_or_default()
        .parse()
        .map_err(|_| StyloError::Validation("Invalid style type".into()))
}

pub(crate) fn parse_occasion(value: Option<&str>) -> Result<Option<Occasion>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| StyloError::Validation("Invalid occasion".into())),
        None => Ok(None),
    }
}

async fn generate(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<OutfitRecord> {
    let style = parse_style(req.style_type.as_deref())?;
    let occasion = parse_occasion(req.occasion.as_deref())?;
    let weather = req.weather.filter(|w| !w.trim().is_empty());

    let outfit = state
        .store
        .write(|db| {
            let mut rng = StdRng::from_os_rng();
            outfits::create_outfit(db, user.id, style, occasion, weather, Utc::now(), &mut rng)
        })
        .await?;

    tracing::info!(user_id = %user.id, outfit_id = %outfit.id, %style, "outfit generated");
    Ok(ApiResponse::ok(outfit).message("Outfit generated successfully"))
}

async fn history(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<OutfitList> {
    let saved_only = query.saved_only.as_deref() == Some("true");
    let outfits = state
        .store
        .read(|db| outfits::history(db, user.id, saved_only))
        .await;
    Ok(ApiResponse::ok(OutfitList { count: outfits.len(), outfits }))
}

async fn save(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(outfit_id): Path<String>,
) -> ApiResult<OutfitRecord> {
    let outfit_id = parse_id(&outfit_id, "Outfit")?;
    let outfit = state
        .store
        .write(|db| outfits::save(db, user.id, outfit_id))
        .await?;
    Ok(ApiResponse::ok(outfit).message("Outfit saved successfully"))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(outfit_id): Path<String>,
) -> ApiResult<()> {
    let outfit_id = parse_id(&outfit_id, "Outfit")?;
    state
        .store
        .write(|db| outfits::delete(db, user.id, outfit_id))
        .await?;
    Ok(ApiResponse::done("Outfit deleted successfully"))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate))
        .route("/history", get(history))
        .route("/{outfit_id}/save", post(save))
        .route("/{outfit_id}", delete(remove))
}
