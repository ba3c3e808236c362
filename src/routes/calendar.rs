//! Google Calendar 連携（コールバック以外はプレミアム）

use super::{parse_date, required, ApiResponse, ApiResult};
use crate::auth::{decode_calendar_state, issue_calendar_state, PremiumUser};
use crate::clients::CalendarEvent;
use crate::services::calendar;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRequest {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeekQuery {
    week_start_date: Option<String>,
}

#[derive(Debug, Serialize)]
struct EventList {
    events: Vec<CalendarEvent>,
    count: usize,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// ブラウザに返す案内ページ
fn page(icon: &str, title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Calendar Connection</title>
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <style>
    body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; display: flex; justify-content: center; align-items: center; min-height: 100vh; margin: 0; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); padding: 20px; }}
    .container {{ background: white; border-radius: 20px; padding: 40px; max-width: 400px; text-align: center; box-shadow: 0 10px 40px rgba(0,0,0,0.2); }}
    .icon {{ font-size: 64px; margin-bottom: 20px; }}
    .code-box {{ background: #f5f5f5; border-radius: 8px; padding: 12px; font-family: monospace; word-break: break-all; margin-bottom: 20px; }}
    h1 {{ color: #333; margin-bottom: 10px; }}
    p {{ color: #666; line-height: 1.6; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="icon">{icon}</div>
    <h1>{title}</h1>
    {body}
    <p style="font-size: 14px; color: #999;">You can close this page and return to the StyloAI app.</p>
  </div>
</body>
</html>"#
    ))
}

/// 手入力用に認可コードを表示する
fn manual_code_page(title: &str, code: &str, note: &str) -> Html<String> {
    page(
        "📋",
        title,
        &format!(
            r#"<p>Copy this code and enter it in the StyloAI app:</p>
    <div class="code-box">{}</div>
    <p style="font-size: 12px; color: #999;">{}</p>"#,
            escape(code),
            escape(note)
        ),
    )
}

async fn callback(State(state): State<Arc<AppState>>, Query(query): Query<CallbackQuery>) -> Html<String> {
    if let Some(error) = query.error.filter(|e| !e.is_empty()) {
        tracing::info!(%error, "calendar authorization cancelled");
        return page(
            "❌",
            "Connection Cancelled",
            "<p>You cancelled the Google Calendar authorization. You can try again from the app.</p>",
        );
    }

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("calendar callback without authorization code");
        return page(
            "⚠️",
            "Authorization Error",
            "<p>No authorization code received. Please try again from the app.</p>",
        );
    };

    let user_id = match query
        .state
        .as_deref()
        .map(|s| decode_calendar_state(s, &state.config.jwt_secret))
    {
        Some(Ok(user_id)) => user_id,
        _ => {
            tracing::warn!("calendar callback without valid state, showing code for manual entry");
            return manual_code_page(
                "Authorization Code",
                &code,
                "Go to Calendar Settings → Enter Authorization Code",
            );
        }
    };

    match calendar::connect(&state, user_id, &code).await {
        Ok(()) => page(
            "✅",
            "Calendar Connected!",
            "<p>Your Google Calendar has been connected to StyloAI. Your outfit plans will now consider your events.</p>",
        ),
        Err(e) => {
            tracing::error!(%user_id, error = %e, "calendar token exchange failed");
            manual_code_page("Connection Issue", &code, &format!("Error: {}", e))
        }
    }
}

async fn auth_url(State(state): State<Arc<AppState>>, PremiumUser(user): PremiumUser) -> ApiResult<Value> {
    let token = issue_calendar_state(user.id, &state.config.jwt_secret)?;
    let url = state.calendar.auth_url(&token)?;
    Ok(ApiResponse::ok(json!({ "authUrl": url })))
}

async fn exchange_code(
    State(state): State<Arc<AppState>>,
    PremiumUser(user): PremiumUser,
    Json(req): Json<ExchangeRequest>,
) -> ApiResult<Value> {
    let code = required(req.code, "Authorization code is required")?;
    calendar::connect(&state, user.id, &code).await?;
    Ok(ApiResponse::ok(json!({ "isConnected": true })).message("Google Calendar connected successfully"))
}

async fn status(State(state): State<Arc<AppState>>, PremiumUser(user): PremiumUser) -> ApiResult<Value> {
    let connected = calendar::is_connected(&state, user.id).await;
    Ok(ApiResponse::ok(json!({ "isConnected": connected })))
}

async fn today(State(state): State<Arc<AppState>>, PremiumUser(user): PremiumUser) -> ApiResult<EventList> {
    let events = calendar::today_events(&state, user.id, Utc::now().date_naive()).await?;
    Ok(ApiResponse::ok(EventList { count: events.len(), events }))
}

async fn week(
    State(state): State<Arc<AppState>>,
    PremiumUser(user): PremiumUser,
    Query(query): Query<WeekQuery>,
) -> ApiResult<EventList> {
    let week_start = required(query.week_start_date, "Week start date is required")?;
    let events = calendar::week_events(&state, user.id, parse_date(&week_start)?).await?;
    Ok(ApiResponse::ok(EventList { count: events.len(), events }))
}

async fn disconnect(State(state): State<Arc<AppState>>, PremiumUser(user): PremiumUser) -> ApiResult<()> {
    calendar::disconnect(&state, user.id).await?;
    tracing::info!(user_id = %user.id, "google calendar disconnected");
    Ok(ApiResponse::done("Google Calendar disconnected successfully"))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/callback", get(callback))
        .route("/auth-url", get(auth_url))
        .route("/exchange-code", post(exchange_code))
        .route("/status", get(status))
        .route("/today", get(today))
        .route("/week", get(week))
        .route("/disconnect", post(disconnect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_manual_code_page_escapes_code() {
        let Html(body) = manual_code_page("Authorization Code", "4/<script>", "note");
        assert!(body.contains("4/&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }
}
