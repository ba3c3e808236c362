//! シーン別コーデ（プレミアム）

use super::outfits::parse_occasion;
use super::{ApiResponse, ApiResult};
use crate::auth::PremiumUser;
use crate::error::StyloError;
use crate::models::OutfitRecord;
use crate::services::occasions;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use stylo_ai_common::{StyleType, StylingGuide};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    occasion: Option<String>,
    style_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OccasionOutfit {
    outfit: OutfitRecord,
    styling_guide: StylingGuide,
}

async fn generate(
    State(state): State<Arc<AppState>>,
    PremiumUser(user): PremiumUser,
    Json(req): Json<GenerateRequest>,
) -> ApiResult<OccasionOutfit> {
    let occasion = parse_occasion(req.occasion.as_deref())?
        .ok_or_else(|| StyloError::Validation("Occasion is required".into()))?;
    // 不明なスタイル指定はシーンの既定に任せる
    let requested = req
        .style_type
        .as_deref()
        .and_then(|s| s.trim().parse::<StyleType>().ok());

    let (outfit, styling_guide) = state
        .store
        .write(|db| {
            let mut rng = StdRng::from_os_rng();
            occasions::generate(db, user.id, occasion, requested, Utc::now(), &mut rng)
        })
        .await?;

    Ok(ApiResponse::ok(OccasionOutfit { outfit, styling_guide })
        .message(format!("{} outfit generated successfully", occasion)))
}

async fn guides(PremiumUser(_user): PremiumUser) -> ApiResult<BTreeMap<String, StylingGuide>> {
    let guides: BTreeMap<String, StylingGuide> = occasions::guides()
        .into_iter()
        .map(|(occasion, guide)| (occasion.as_str().to_string(), guide))
        .collect();
    Ok(ApiResponse::ok(guides))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(generate))
        .route("/guides", get(guides))
}
