//! コーデの生成と保存

use crate::error::{Result, StyloError};
use crate::models::OutfitRecord;
use crate::store::Database;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use stylo_ai_common::{select_outfit, Occasion, RecentlyWorn, StyleType, WardrobeItem};
use uuid::Uuid;

/// 着用履歴を重複判定に使う期間（日）
pub const RECENTLY_WORN_DAYS: i64 = 30;

/// 履歴一覧の上限
pub const HISTORY_LIMIT: usize = 50;

pub fn wardrobe_items(db: &Database, user_id: Uuid) -> Vec<WardrobeItem> {
    db.wardrobe
        .iter()
        .filter(|w| w.user_id == user_id)
        .map(|w| w.to_item())
        .collect()
}

/// 直近30日に着用したコーデ（デイリーの着用記録とスタイル履歴から）
pub fn recently_worn(db: &Database, user_id: Uuid, now: DateTime<Utc>) -> RecentlyWorn {
    let since = now - Duration::days(RECENTLY_WORN_DAYS);
    let since_date = since.date_naive();

    let from_daily = db
        .daily_outfits
        .iter()
        .filter(|d| d.user_id == user_id && d.is_worn)
        .filter(|d| d.worn_at.is_some_and(|at| at >= since))
        .map(|d| d.outfit_id);

    let from_history = db
        .style_history
        .iter()
        .filter(|h| h.user_id == user_id && h.worn_date >= since_date)
        .map(|h| h.outfit_id);

    let mut worn = RecentlyWorn::new();
    let mut seen = std::collections::HashSet::new();
    for outfit_id in from_daily.chain(from_history) {
        if !seen.insert(outfit_id) {
            continue;
        }
        if let Some(outfit) = db.outfit(user_id, outfit_id) {
            worn.insert(outfit.id, outfit.main_item_ids());
        }
    }
    worn
}

/// コーデを生成してストアに追加する
pub fn create_outfit<R: Rng + ?Sized>(
    db: &mut Database,
    user_id: Uuid,
    style: StyleType,
    occasion: Option<Occasion>,
    weather: Option<String>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<OutfitRecord> {
    let wardrobe = wardrobe_items(db, user_id);
    let worn = recently_worn(db, user_id, now);

    let selection = select_outfit(&wardrobe, style, occasion, &worn, rng)?;
    if let Some(previous) = selection.recently_worn {
        tracing::debug!(%user_id, %previous, "generated outfit repeats a recently worn one");
    }

    let outfit = OutfitRecord::from_selection(user_id, selection, style, occasion, weather);
    db.outfits.push(outfit.clone());
    Ok(outfit)
}

/// 履歴（新しい順、最大50件）
pub fn history(db: &Database, user_id: Uuid, saved_only: bool) -> Vec<OutfitRecord> {
    let mut outfits: Vec<OutfitRecord> = db
        .outfits
        .iter()
        .filter(|o| o.user_id == user_id && (!saved_only || o.is_saved))
        .cloned()
        .collect();
    outfits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    outfits.truncate(HISTORY_LIMIT);
    outfits
}

pub fn save(db: &mut Database, user_id: Uuid, outfit_id: Uuid) -> Result<OutfitRecord> {
    let outfit = db.outfit_mut(user_id, outfit_id)?;
    outfit.is_saved = true;
    Ok(outfit.clone())
}

pub fn delete(db: &mut Database, user_id: Uuid, outfit_id: Uuid) -> Result<()> {
    let before = db.outfits.len();
    db.outfits.retain(|o| !(o.id == outfit_id && o.user_id == user_id));
    if db.outfits.len() == before {
        return Err(StyloError::NotFound("Outfit not found".into()));
    }
    Ok(())
}
