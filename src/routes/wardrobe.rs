//! ワードローブ

use super::{parse_id, upload_body_limit, ApiResponse, ApiResult, UploadForm};
use crate::auth::AuthUser;
use crate::error::StyloError;
use crate::models::WardrobeRecord;
use crate::services::wardrobe::{self, NewItem};
use crate::state::AppState;
use axum::extract::{Multipart, Path, Query, State};
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stylo_ai_common::Category;

#[derive(Debug, Deserialize)]
struct ListQuery {
    category: Option<String>,
}

#[derive(Debug, Serialize)]
struct ItemList {
    items: Vec<WardrobeRecord>,
    count: usize,
}

fn parse_category(value: Option<&str>) -> Result<Category, StyloError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StyloError::Validation("Category is required".into()))?
        .parse::<Category>()
        .map_err(|_| StyloError::Validation("Invalid category".into()))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> ApiResult<WardrobeRecord> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form.take_image()?;
    let item = NewItem {
        category: parse_category(form.field("category"))?,
        color: form.field("color").unwrap_or_default().to_string(),
        style_tags: wardrobe::parse_style_tags(form.field("styleTags").unwrap_or_default()),
    };

    let record = wardrobe::add(&state, user.id, image, item, Utc::now()).await?;
    Ok(ApiResponse::ok(record)
        .message("Wardrobe item uploaded successfully")
        .created())
}

async fn list(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<ItemList> {
    let category = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(c) => Some(parse_category(Some(c))?),
        None => None,
    };
    let items = wardrobe::list(&state, user.id, category).await;
    Ok(ApiResponse::ok(ItemList { count: items.len(), items }))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(item_id): Path<String>,
) -> ApiResult<()> {
    let item_id = parse_id(&item_id, "Wardrobe item")?;
    wardrobe::remove(&state, user.id, item_id).await?;
    Ok(ApiResponse::done("Wardrobe item deleted successfully"))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list))
        .route("/upload", post(upload))
        .route("/{item_id}", delete(remove))
        .layer(upload_body_limit())
}
