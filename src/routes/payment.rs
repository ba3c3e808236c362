//! プレミアム決済（PhonePe）

use super::{ApiResponse, ApiResult};
use crate::auth::AuthUser;
use crate::error::StyloError;
use crate::models::PlanType;
use crate::services::payment::{self, OrderCreated, Plan, PremiumStatus, Verification};
use crate::state::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRequest {
    amount: Option<u32>,
    plan_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest {
    merchant_transaction_id: Option<String>,
    transaction_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookRequest {
    response: Option<String>,
}

fn parse_plan(value: &str) -> Result<PlanType, StyloError> {
    match value.trim() {
        "monthly" => Ok(PlanType::Monthly),
        "yearly" => Ok(PlanType::Yearly),
        _ => Err(StyloError::Validation("Invalid plan type".into())),
    }
}

async fn plans(AuthUser(_user): AuthUser) -> ApiResult<Vec<Plan>> {
    Ok(ApiResponse::ok(payment::plans()))
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<OrderRequest>,
) -> ApiResult<OrderCreated> {
    let (amount, plan_type) = match (req.amount, req.plan_type.as_deref()) {
        (Some(amount), Some(plan)) if amount > 0 => (amount, parse_plan(plan)?),
        _ => return Err(StyloError::Validation("Amount and planType are required".into())),
    };

    let order = payment::create_order(&state, &user, plan_type, amount, Utc::now()).await?;
    Ok(ApiResponse::ok(order))
}

async fn verify(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<VerifyRequest>,
) -> ApiResult<Value> {
    let txn = req
        .merchant_transaction_id
        .or(req.transaction_id)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| StyloError::Validation("Transaction ID is required".into()))?;

    Ok(match payment::verify(&state, user.id, &txn, Utc::now()).await? {
        Verification::Completed { transaction_id, amount } => ApiResponse::ok(json!({
            "transactionId": transaction_id,
            "amount": amount,
            "premiumStatus": true,
        }))
        .message("Payment successful. Premium activated!"),
        Verification::Incomplete { code, state } => {
            ApiResponse::failed("Payment failed or pending", json!({ "code": code, "state": state }))
        }
    })
}

/// PhonePe からのサーバー間通知（認証なし、X-VERIFY で検証）
async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<WebhookRequest>,
) -> ApiResult<()> {
    let encoded = req
        .response
        .filter(|r| !r.is_empty())
        .ok_or_else(|| StyloError::Validation("Missing webhook payload".into()))?;
    let x_verify = headers.get("x-verify").and_then(|v| v.to_str().ok());

    let activated = payment::handle_webhook(&state, &encoded, x_verify, Utc::now()).await?;
    Ok(ApiResponse::done(if activated {
        "Webhook processed successfully"
    } else {
        "Webhook received"
    }))
}

async fn status(State(state): State<Arc<AppState>>, AuthUser(user): AuthUser) -> ApiResult<PremiumStatus> {
    let status = payment::premium_status(&state, user.id, Utc::now()).await?;
    Ok(ApiResponse::ok(status))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/callback", post(callback))
        .route("/plans", get(plans))
        .route("/status", get(status))
        .route("/create-order", post(create_order))
        .route("/verify", post(verify))
}
