//! APIエンドツーエンドテスト
//!
//! インメモリストアに対して axum-test の TestServer で検証する。

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use stylo_ai::config::Config;
use stylo_ai::server;
use stylo_ai::services::payment;
use stylo_ai::state::AppState;
use stylo_ai::store::Store;
use tempfile::TempDir;
use uuid::Uuid;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

struct Harness {
    server: TestServer,
    state: Arc<AppState>,
    _uploads: TempDir,
}

fn harness() -> Harness {
    let uploads = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config {
        jwt_secret: "test-secret".into(),
        upload_dir: uploads.path().to_path_buf(),
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config, Store::in_memory()).unwrap());
    let server = TestServer::new(server::app(state.clone())).unwrap();
    Harness { server, state, _uploads: uploads }
}

async fn register(server: &TestServer, email: &str) -> (String, Uuid) {
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": email, "password": "secret123" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = response.json::<Value>();
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let id = body["data"]["user"]["id"].as_str().unwrap().parse().unwrap();
    (token, id)
}

async fn upload_item(server: &TestServer, token: &str, category: &str, color: &str) {
    let form = MultipartForm::new()
        .add_text("category", category)
        .add_text("color", color)
        .add_text("styleTags", "casual, relaxed")
        .add_part("image", Part::bytes(PNG_MAGIC.to_vec()).file_name("item.png").mime_type("image/png"));

    let response = server
        .post("/api/wardrobe/upload")
        .authorization_bearer(token)
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

async fn make_premium(state: &AppState, user_id: Uuid) {
    state
        .store
        .write(|db| payment::activate_premium(db, user_id, Utc::now()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_health_and_fallback() {
    let h = harness();

    let response = h.server.get("/api/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "ok");

    let response = h.server.get("/api/does-not-exist").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": false, "message": "Route not found" })
    );
}

#[tokio::test]
async fn test_register_login_and_me() {
    let h = harness();
    let (token, id) = register(&h.server, "Alice@Example.com").await;

    let response = h
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "secret123" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["data"]["user"]["isPremium"], false);

    let response = h.server.get("/api/auth/me").authorization_bearer(&token).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let me = response.json::<Value>();
    assert_eq!(me["data"]["id"], id.to_string());
    assert_eq!(me["data"]["email"], "alice@example.com");
    assert!(me["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let h = harness();
    register(&h.server, "bob@example.com").await;

    let response = h
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "bob@example.com", "password": "another1" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["message"], "User already exists with this email");

    let response = h
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "carol@example.com", "password": "123" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = h
        .server
        .post("/api/auth/register")
        .json(&json!({ "email": "dave@example.com" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Email and password are required");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let h = harness();
    register(&h.server, "erin@example.com").await;

    let response = h
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "erin@example.com", "password": "wrong-pass" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let h = harness();

    let response = h.server.get("/api/wardrobe").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["success"], false);

    let response = h.server.get("/api/wardrobe").authorization_bearer("not-a-jwt").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_premium_gate() {
    let h = harness();
    let (token, id) = register(&h.server, "frank@example.com").await;

    let response = h.server.get("/api/gaps").authorization_bearer(&token).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["isPremium"], false);

    make_premium(&h.state, id).await;

    let response = h.server.get("/api/gaps").authorization_bearer(&token).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["message"], "No gap analysis found");
    assert!(body["data"].is_null());

    let response = h.server.post("/api/gaps/detect").authorization_bearer(&token).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let missing = response.json::<Value>()["data"]["missingItems"].clone();
    assert!(!missing.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_outfit_with_empty_wardrobe() {
    let h = harness();
    let (token, _) = register(&h.server, "gina@example.com").await;

    let response = h
        .server
        .post("/api/outfits/generate")
        .authorization_bearer(&token)
        .json(&json!({ "styleType": "Casual" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "No items in wardrobe");

    let response = h
        .server
        .post("/api/outfits/generate")
        .authorization_bearer(&token)
        .json(&json!({ "styleType": "Professional" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Invalid style type");
}

#[tokio::test]
async fn test_wardrobe_upload_list_and_generate() {
    let h = harness();
    let (token, _) = register(&h.server, "hana@example.com").await;

    upload_item(&h.server, &token, "Tops", "White").await;
    upload_item(&h.server, &token, "Bottoms", "navy").await;

    let response = h.server.get("/api/wardrobe").authorization_bearer(&token).await;
    let body = response.json::<Value>();
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["items"][0]["color"].as_str().map(|c| c == c.to_lowercase()), Some(true));

    let response = h
        .server
        .get("/api/wardrobe")
        .add_query_param("category", "Tops")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.json::<Value>()["data"]["count"], 1);

    let response = h
        .server
        .post("/api/outfits/generate")
        .authorization_bearer(&token)
        .json(&json!({ "styleType": "Casual", "occasion": "Office" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let outfit = response.json::<Value>()["data"].clone();
    assert_eq!(outfit["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_wardrobe_upload_requires_image_and_category() {
    let h = harness();
    let (token, _) = register(&h.server, "ivan@example.com").await;

    let form = MultipartForm::new().add_text("category", "Tops");
    let response = h
        .server
        .post("/api/wardrobe/upload")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "No image file provided");

    let form = MultipartForm::new()
        .add_text("category", "Hats")
        .add_part("image", Part::bytes(PNG_MAGIC.to_vec()).file_name("item.png").mime_type("image/png"));
    let response = h
        .server
        .post("/api/wardrobe/upload")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Invalid category");
}

#[tokio::test]
async fn test_config_check_reports_unconfigured() {
    let h = harness();

    let response = h.server.get("/api/config/check").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let data = response.json::<Value>()["data"].clone();
    assert_eq!(data["googleCalendar"]["configured"], false);
    assert_eq!(data["phonePe"]["configured"], false);
    assert_eq!(data["cloudinary"]["configured"], false);
}

#[tokio::test]
async fn test_payment_plans_and_unconfigured_order() {
    let h = harness();
    let (token, _) = register(&h.server, "jun@example.com").await;

    let response = h.server.get("/api/payment/plans").authorization_bearer(&token).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 2);

    let response = h
        .server
        .post("/api/payment/create-order")
        .authorization_bearer(&token)
        .json(&json!({ "planType": "monthly" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Amount and planType are required");
}

#[tokio::test]
async fn test_style_history_list_and_progress_shape() {
    let h = harness();
    let (token, _) = register(&h.server, "kei@example.com").await;
    upload_item(&h.server, &token, "Tops", "white").await;
    upload_item(&h.server, &token, "Bottoms", "black").await;

    let response = h.server.get("/api/style-history/history").authorization_bearer(&token).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["data"], json!([]));

    let outfit = h
        .server
        .post("/api/outfits/generate")
        .authorization_bearer(&token)
        .json(&json!({ "styleType": "Casual" }))
        .await
        .json::<Value>()["data"]["id"]
        .clone();

    let response = h
        .server
        .post("/api/style-history/track")
        .authorization_bearer(&token)
        .json(&json!({ "outfitId": outfit, "wornDate": "2024-05-01", "rating": 4 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body = h
        .server
        .get("/api/style-history/history")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    let records = body["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["outfitId"], outfit);

    let progress = h
        .server
        .get("/api/style-history/progress")
        .authorization_bearer(&token)
        .await
        .json::<Value>()["data"]
        .clone();
    assert_eq!(progress["totalOutfits"], 1);
    assert_eq!(progress["recentHistory"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_daily_and_weekly_planner_flow() {
    let h = harness();
    let (token, id) = register(&h.server, "luna@example.com").await;
    make_premium(&h.state, id).await;
    upload_item(&h.server, &token, "Tops", "white").await;
    upload_item(&h.server, &token, "Bottoms", "black").await;

    // 未生成のときも data キーは null で返る
    let body = h.server.get("/api/daily-outfit/today").authorization_bearer(&token).await.json::<Value>();
    assert_eq!(body["message"], "No outfit generated for today");
    assert!(body.as_object().unwrap().contains_key("data"));
    assert!(body["data"].is_null());

    let body = h
        .server
        .post("/api/daily-outfit/generate")
        .authorization_bearer(&token)
        .json(&json!({ "userMood": "casual", "calendarEvents": [{ "type": "meeting", "title": "Standup" }] }))
        .await
        .json::<Value>();
    assert_eq!(body["data"]["dailyOutfit"]["occasion"], "Office");
    assert_eq!(body["data"]["dailyOutfit"]["styleType"], "Traditional");
    let daily_id = body["data"]["dailyOutfit"]["id"].as_str().unwrap().to_string();

    let response = h
        .server
        .post("/api/daily-outfit/mark-worn")
        .authorization_bearer(&token)
        .json(&json!({ "dailyOutfitId": daily_id, "rating": 9 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body = h
        .server
        .get("/api/planner/weekly")
        .add_query_param("weekStartDate", "2024-03-04")
        .authorization_bearer(&token)
        .await
        .json::<Value>();
    assert_eq!(body["message"], "No plan found for this week");
    assert!(body.as_object().unwrap().contains_key("data"));

    let response = h
        .server
        .post("/api/planner/generate")
        .authorization_bearer(&token)
        .json(&json!({ "weekStartDate": "2024-03-04" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let plan = response.json::<Value>()["data"].clone();
    let days = plan["planner"]["outfits"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[5]["occasion"], "Party");
    assert_eq!(days[6]["occasion"], "Party");
    assert_eq!(days[0]["occasion"], "Daily");

    let response = h
        .server
        .post("/api/planner/confirm")
        .authorization_bearer(&token)
        .json(&json!({ "plannerId": plan["planner"]["id"] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Planner ID, date, and outfit ID are required");
}
