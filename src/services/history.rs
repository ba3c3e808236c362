//! 着用記録とスタイルの成長分析

use crate::error::{Result, StyloError};
use crate::models::{StyleHistoryRecord, StylePhoto};
use crate::store::Database;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use stylo_ai_common::style_score::{improvement_suggestions, progress as summarize, ScoredEntry};
use stylo_ai_common::{style_score, StyleProgress};
use uuid::Uuid;

pub const DEFAULT_LIMIT: usize = 30;

/// 成長分析に添える直近の記録数
pub const RECENT_HISTORY: usize = 10;

/// 集計結果と直近の着用記録
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    #[serde(flatten)]
    pub summary: StyleProgress,
    pub recent_history: Vec<StyleHistoryRecord>,
}

#[derive(Debug, Clone)]
pub struct TrackRequest {
    pub outfit_id: Uuid,
    pub worn_date: NaiveDate,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub photos: Vec<StylePhoto>,
}

pub fn track(db: &mut Database, user_id: Uuid, request: TrackRequest, now: DateTime<Utc>) -> Result<StyleHistoryRecord> {
    if let Some(r) = request.rating {
        if !(1..=5).contains(&r) {
            return Err(StyloError::Validation("Rating must be between 1 and 5".into()));
        }
    }

    let occasion = db
        .outfit(user_id, request.outfit_id)
        .ok_or_else(|| StyloError::NotFound("Outfit not found".into()))?
        .occasion;

    let feedback = request.feedback.filter(|f| !f.trim().is_empty());
    let record = StyleHistoryRecord {
        id: Uuid::new_v4(),
        user_id,
        outfit_id: request.outfit_id,
        worn_date: request.worn_date,
        occasion,
        rating: request.rating,
        style_score: style_score(request.rating, feedback.as_deref()),
        improvement_suggestions: improvement_suggestions(request.rating, feedback.as_deref()),
        feedback,
        photos: request.photos,
        created_at: now,
    };

    db.style_history.push(record.clone());
    Ok(record)
}

/// 着用日の新しい順
pub fn list(db: &Database, user_id: Uuid, limit: Option<usize>) -> Vec<StyleHistoryRecord> {
    let mut records: Vec<StyleHistoryRecord> = db
        .style_history
        .iter()
        .filter(|h| h.user_id == user_id)
        .cloned()
        .collect();
    records.sort_by(|a, b| {
        b.worn_date
            .cmp(&a.worn_date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    records.truncate(limit.unwrap_or(DEFAULT_LIMIT));
    records
}

pub fn progress(db: &Database, user_id: Uuid) -> ProgressReport {
    let mut records = list(db, user_id, Some(usize::MAX));
    let entries: Vec<ScoredEntry> = records
        .iter()
        .map(|h| ScoredEntry {
            rating: h.rating,
            style_score: h.style_score,
            occasion: h.occasion,
        })
        .collect();

    records.truncate(RECENT_HISTORY);
    ProgressReport {
        summary: summarize(&entries),
        recent_history: records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutfitRecord;
    use stylo_ai_common::{Occasion, OutfitSelection, StyleType};

    fn db_with_outfit(user_id: Uuid) -> (Database, Uuid) {
        let mut db = Database::default();
        let outfit = OutfitRecord::from_selection(
            user_id,
            OutfitSelection::default(),
            StyleType::Casual,
            Some(Occasion::Travel),
            None,
        );
        let id = outfit.id;
        db.outfits.push(outfit);
        (db, id)
    }

    fn request(outfit_id: Uuid, day: u32, rating: u8, feedback: &str) -> TrackRequest {
        TrackRequest {
            outfit_id,
            worn_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            rating: Some(rating),
            feedback: Some(feedback.to_string()),
            photos: Vec::new(),
        }
    }

    #[test]
    fn test_track_scores_and_inherits_occasion() {
        let user = Uuid::new_v4();
        let (mut db, outfit) = db_with_outfit(user);

        let record = track(&mut db, user, request(outfit, 1, 5, "Love it, so comfortable"), Utc::now()).unwrap();
        assert_eq!(record.style_score, 80);
        assert_eq!(record.occasion, Some(Occasion::Travel));
        assert!(!record.improvement_suggestions.is_empty());
    }

    #[test]
    fn test_track_rejects_foreign_outfit_and_bad_rating() {
        let user = Uuid::new_v4();
        let (mut db, outfit) = db_with_outfit(user);

        assert!(matches!(
            track(&mut db, Uuid::new_v4(), request(outfit, 1, 3, ""), Utc::now()),
            Err(StyloError::NotFound(_))
        ));
        assert!(matches!(
            track(&mut db, user, request(outfit, 1, 9, ""), Utc::now()),
            Err(StyloError::Validation(_))
        ));
        assert!(db.style_history.is_empty());
    }

    #[test]
    fn test_list_newest_first_with_limit() {
        let user = Uuid::new_v4();
        let (mut db, outfit) = db_with_outfit(user);
        for day in [3, 10, 7] {
            track(&mut db, user, request(outfit, day, 4, ""), Utc::now()).unwrap();
        }

        let days: Vec<u32> = list(&db, user, Some(2)).iter().map(|h| chrono::Datelike::day(&h.worn_date)).collect();
        assert_eq!(days, vec![10, 7]);

        let report = progress(&db, user);
        assert_eq!(report.summary.total_outfits, 3);
        assert_eq!(report.summary.average_rating, 4.0);
        assert_eq!(report.recent_history.len(), 3);
    }

    #[test]
    fn test_progress_keeps_ten_newest_records() {
        let user = Uuid::new_v4();
        let (mut db, outfit) = db_with_outfit(user);
        for day in 1..=12 {
            track(&mut db, user, request(outfit, day, 3, ""), Utc::now()).unwrap();
        }

        let report = progress(&db, user);
        assert_eq!(report.summary.total_outfits, 12);
        assert_eq!(report.recent_history.len(), RECENT_HISTORY);
        assert_eq!(chrono::Datelike::day(&report.recent_history[0].worn_date), 12);
        assert_eq!(chrono::Datelike::day(&report.recent_history[9].worn_date), 3);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalOutfits"], 12);
        assert_eq!(json["recentHistory"].as_array().unwrap().len(), 10);
    }
}
