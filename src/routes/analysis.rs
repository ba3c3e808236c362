//! 体型・顔写真の解析

use super::{upload_body_limit, ApiResponse, ApiResult, UploadForm};
use crate::auth::AuthUser;
use crate::models::PhotoAnalysis;
use crate::services::account::{self, PhotoKind};
use crate::state::AppState;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::Router;
use chrono::Utc;
use std::sync::Arc;

async fn upload(state: &AppState, user_id: uuid::Uuid, kind: PhotoKind, multipart: Multipart) -> ApiResult<PhotoAnalysis> {
    let image = UploadForm::read(multipart).await?.take_image()?;
    let analysis = account::analyze_photo(state, user_id, kind, image, Utc::now()).await?;

    let message = match kind {
        PhotoKind::Body => "Body image uploaded and analyzed",
        PhotoKind::Face => "Face image uploaded and analyzed",
    };
    Ok(ApiResponse::ok(analysis).message(message))
}

async fn body(State(state): State<Arc<AppState>>, AuthUser(user): AuthUser, multipart: Multipart) -> ApiResult<PhotoAnalysis> {
    upload(&state, user.id, PhotoKind::Body, multipart).await
}

async fn face(State(state): State<Arc<AppState>>, AuthUser(user): AuthUser, multipart: Multipart) -> ApiResult<PhotoAnalysis> {
    upload(&state, user.id, PhotoKind::Face, multipart).await
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/body", post(body))
        .route("/face", post(face))
        .layer(upload_body_limit())
}
