//! ワードローブ

use crate::error::{Result, StyloError};
use crate::models::WardrobeRecord;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use stylo_ai_common::Category;
use uuid::Uuid;

/// アップロード時の入力
#[derive(Debug, Clone)]
pub struct NewItem {
    pub category: Category,
    pub color: String,
    pub style_tags: Vec<String>,
}

/// スタイルタグをパースする（JSON配列またはカンマ区切り）
pub fn parse_style_tags(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let tags: Vec<String> = serde_json::from_str::<Vec<String>>(raw)
        .unwrap_or_else(|_| raw.split(',').map(String::from).collect());

    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn folder_for(user_id: Uuid) -> String {
    format!("styloai/wardrobe/{}", user_id)
}

pub async fn add(
    state: &AppState,
    user_id: Uuid,
    image: Vec<u8>,
    item: NewItem,
    now: DateTime<Utc>,
) -> Result<WardrobeRecord> {
    let saved = state.images.save(image, &folder_for(user_id)).await?;

    let record = WardrobeRecord {
        id: Uuid::new_v4(),
        user_id,
        category: item.category,
        color: item.color.trim().to_lowercase(),
        style_tags: item.style_tags,
        image_url: saved.url,
        storage: saved.storage,
        created_at: now,
    };

    let stored = record.clone();
    let result = state
        .store
        .write(|db| {
            db.wardrobe.push(stored);
            Ok(())
        })
        .await;

    if let Err(e) = result {
        // 記録できなかった画像は残さない
        state.images.delete(&record.storage).await;
        return Err(e);
    }

    tracing::info!(%user_id, item_id = %record.id, category = %record.category, "wardrobe item added");
    Ok(record)
}

/// 一覧（新しい順）
pub async fn list(state: &AppState, user_id: Uuid, category: Option<Category>) -> Vec<WardrobeRecord> {
    state
        .store
        .read(|db| {
            db.wardrobe_of(user_id)
                .into_iter()
                .filter(|w| category.map_or(true, |c| w.category == c))
                .cloned()
                .collect()
        })
        .await
}

pub async fn remove(state: &AppState, user_id: Uuid, item_id: Uuid) -> Result<()> {
    let removed = state
        .store
        .write(|db| {
            let index = db
                .wardrobe
                .iter()
                .position(|w| w.id == item_id && w.user_id == user_id)
                .ok_or_else(|| StyloError::NotFound("Wardrobe item not found".into()))?;
            Ok(db.wardrobe.remove(index))
        })
        .await?;

    state.images.delete(&removed.storage).await;
    tracing::info!(%user_id, %item_id, "wardrobe item deleted");
    Ok(())
}
