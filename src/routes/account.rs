//! 認証・プロフィール

use super::{required, ApiResponse, ApiResult};
use crate::auth::AuthUser;
use crate::models::{Gender, StyleGoal, UserView};
use crate::services::account;
use crate::state::AppState;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use stylo_ai_common::Occasion;

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: Option<String>,
    phone: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRequest {
    gender: Option<Gender>,
    style_goals: Option<Vec<StyleGoal>>,
    occasions: Option<Vec<Occasion>>,
}

fn session_body(session: &account::Session) -> Value {
    json!({
        "token": session.token,
        "user": {
            "id": session.user.id,
            "email": session.user.email,
            "phone": session.user.phone,
            "isPremium": session.user.premium_active(chrono::Utc::now()),
        },
    })
}

async fn register(State(state): State<Arc<AppState>>, Json(req): Json<RegisterRequest>) -> ApiResult<Value> {
    let email = required(req.email, "Email and password are required")?;
    let password = required(req.password, "Email and password are required")?;

    let session = account::register(&state, &email, req.phone, &password).await?;
    Ok(ApiResponse::ok(session_body(&session))
        .message("User registered successfully")
        .created())
}

async fn login(State(state): State<Arc<AppState>>, Json(req): Json<LoginRequest>) -> ApiResult<Value> {
    let email = required(req.email, "Email and password are required")?;
    let password = required(req.password, "Email and password are required")?;

    let session = account::login(&state, &email, &password).await?;
    Ok(ApiResponse::ok(session_body(&session)).message("Login successful"))
}

async fn me(AuthUser(user): AuthUser) -> ApiResult<UserView> {
    Ok(ApiResponse::ok(UserView::from(&user)))
}

async fn setup(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<ProfileRequest>,
) -> ApiResult<UserView> {
    let updated = state
        .store
        .write(|db| account::setup_profile(db, user.id, req.gender, req.style_goals, req.occasions))
        .await?;
    Ok(ApiResponse::ok(UserView::from(&updated)).message("Profile setup completed"))
}

pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

pub fn profile_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(me))
        .route("/setup", post(setup))
}
