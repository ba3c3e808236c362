//! アカウント（登録・ログイン・プロフィール・写真解析）

use crate::auth::{hash_password, issue_token, verify_password, MIN_PASSWORD_LEN};
use crate::config::Config;
use crate::error::{Result, StyloError};
use crate::models::{Gender, PhotoAnalysis, StyleGoal, User};
use crate::state::AppState;
use crate::store::Database;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use stylo_ai_common::Occasion;
use uuid::Uuid;

/// 登録・ログイン結果
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

pub fn register_user(db: &mut Database, email: &str, phone: Option<String>, password: &str) -> Result<User> {
    let email = normalize_email(email);
    if !looks_like_email(&email) {
        return Err(StyloError::Validation("Please provide a valid email".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(StyloError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if db.user_by_email(&email).is_some() {
        return Err(StyloError::Conflict("User already exists with this email".into()));
    }

    let phone = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    let user = User::new(email, phone, hash_password(password)?);
    db.users.push(user.clone());
    Ok(user)
}

pub async fn register(state: &AppState, email: &str, phone: Option<String>, password: &str) -> Result<Session> {
    let user = state
        .store
        .write(|db| register_user(db, email, phone, password))
        .await?;
    tracing::info!(user_id = %user.id, "user registered");
    session(&state.config, user)
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<Session> {
    let email = normalize_email(email);
    let user = state
        .store
        .read(|db| db.user_by_email(&email).cloned())
        .await
        .filter(|u| verify_password(password, &u.password_hash))
        .ok_or_else(|| StyloError::Unauthorized("Invalid credentials".into()))?;

    tracing::debug!(user_id = %user.id, "user logged in");
    session(&state.config, user)
}

fn session(config: &Config, user: User) -> Result<Session> {
    Ok(Session {
        token: issue_token(user.id, &config.jwt_secret, config.jwt_expiry_days)?,
        user,
    })
}

/// プロフィール設定（指定された項目のみ更新）
pub fn setup_profile(
    db: &mut Database,
    user_id: Uuid,
    gender: Option<Gender>,
    style_goals: Option<Vec<StyleGoal>>,
    occasions: Option<Vec<Occasion>>,
) -> Result<User> {
    let user = db.user_mut(user_id)?;
    if gender.is_some() {
        user.gender = gender;
    }
    if let Some(goals) = style_goals {
        user.style_goals = goals;
    }
    if let Some(occasions) = occasions {
        user.occasions = occasions;
    }
    Ok(user.clone())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoKind {
    Body,
    Face,
}

impl PhotoKind {
    pub fn folder(&self) -> &'static str {
        match self {
            PhotoKind::Body => "styloai/body",
            PhotoKind::Face => "styloai/face",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PhotoKind::Body => "Body",
            PhotoKind::Face => "Face",
        }
    }
}

/// 解析待ちのプレースホルダー
pub fn pending_analysis(kind: PhotoKind, now: DateTime<Utc>) -> Value {
    json!({
        "uploadedAt": now,
        "analysis": format!("{} image uploaded successfully. AI analysis pending.", kind.label()),
    })
}

/// 解析結果に付加情報を足す
pub fn completed_analysis(kind: PhotoKind, analysis: Value) -> Value {
    let mut data = match analysis {
        Value::Object(map) => map,
        other => {
            let mut map = serde_json::Map::new();
            map.insert("analysis".into(), other);
            map
        }
    };
    data.insert("confidence".into(), json!("high"));
    data.insert(
        "analysisType".into(),
        json!(match kind {
            PhotoKind::Body => "body",
            PhotoKind::Face => "face",
        }),
    );
    data.insert("model".into(), json!("aws-rekognition"));
    Value::Object(data)
}

/// 写真を保存して解析し、プロフィールに記録する
pub async fn analyze_photo(
    state: &AppState,
    user_id: Uuid,
    kind: PhotoKind,
    bytes: Vec<u8>,
    now: DateTime<Utc>,
) -> Result<PhotoAnalysis> {
    let saved = state.images.save(bytes.clone(), kind.folder()).await?;

    let analysis_data = if state.vision.is_enabled() {
        let analysis = match kind {
            PhotoKind::Body => serde_json::to_value(state.vision.analyze_body(&bytes).await?)?,
            PhotoKind::Face => serde_json::to_value(state.vision.analyze_face(&bytes).await?)?,
        };
        completed_analysis(kind, analysis)
    } else {
        pending_analysis(kind, now)
    };

    let record = PhotoAnalysis {
        image_url: saved.url,
        analysis_data,
        uploaded_at: now,
    };

    state
        .store
        .write(|db| {
            let user = db.user_mut(user_id)?;
            match kind {
                PhotoKind::Body => user.body_analysis = Some(record.clone()),
                PhotoKind::Face => user.face_analysis = Some(record.clone()),
            }
            Ok(())
        })
        .await?;

    tracing::info!(%user_id, ?kind, vision = state.vision.is_enabled(), "photo analyzed");
    Ok(record)
}
