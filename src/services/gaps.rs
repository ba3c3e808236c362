//! 不足アイテムレポート

use crate::error::{Result, StyloError};
use crate::models::GapReport;
use crate::services::outfits::wardrobe_items;
use crate::store::Database;
use chrono::{DateTime, Utc};
use stylo_ai_common::detect_gaps;
use uuid::Uuid;

/// 検出してレポートを保存する（未解決レポートはユーザーごとに1件）
pub fn detect(db: &mut Database, user_id: Uuid, now: DateTime<Utc>) -> Result<GapReport> {
    let occasions = db
        .user(user_id)
        .map(|u| u.occasions.clone())
        .ok_or_else(|| StyloError::NotFound("User not found".into()))?;
    let missing_items = detect_gaps(&wardrobe_items(db, user_id), &occasions);

    tracing::debug!(%user_id, missing = missing_items.len(), "wardrobe gaps detected");

    if let Some(report) = db
        .gaps
        .iter_mut()
        .find(|g| g.user_id == user_id && !g.is_resolved)
    {
        report.missing_items = missing_items;
        report.analysis_date = now;
        return Ok(report.clone());
    }

    let report = GapReport {
        id: Uuid::new_v4(),
        user_id,
        missing_items,
        analysis_date: now,
        is_resolved: false,
        resolved_at: None,
    };
    db.gaps.push(report.clone());
    Ok(report)
}

/// 最新の未解決レポート
pub fn latest(db: &Database, user_id: Uuid) -> Option<GapReport> {
    db.gaps
        .iter()
        .filter(|g| g.user_id == user_id && !g.is_resolved)
        .max_by_key(|g| g.analysis_date)
        .cloned()
}

pub fn resolve(db: &mut Database, user_id: Uuid, gap_id: Uuid, now: DateTime<Utc>) -> Result<GapReport> {
    let report = db
        .gaps
        .iter_mut()
        .find(|g| g.id == gap_id && g.user_id == user_id)
        .ok_or_else(|| StyloError::NotFound("Gap analysis not found".into()))?;

    report.is_resolved = true;
    report.resolved_at = Some(now);
    Ok(report.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn db_with_user() -> (Database, Uuid) {
        let mut db = Database::default();
        let user = User::new("gap@example.com".into(), None, "h".into());
        let id = user.id;
        db.users.push(user);
        (db, id)
    }

    #[test]
    fn test_detect_keeps_single_open_report() {
        let (mut db, user) = db_with_user();
        let first = detect(&mut db, user, Utc::now()).unwrap();
        assert!(!first.missing_items.is_empty());

        let second = detect(&mut db, user, Utc::now()).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(db.gaps.len(), 1);
    }

    #[test]
    fn test_resolve_then_new_report() {
        let (mut db, user) = db_with_user();
        let report = detect(&mut db, user, Utc::now()).unwrap();

        assert!(matches!(
            resolve(&mut db, Uuid::new_v4(), report.id, Utc::now()),
            Err(StyloError::NotFound(_))
        ));
        assert!(resolve(&mut db, user, report.id, Utc::now()).unwrap().is_resolved);
        assert!(latest(&db, user).is_none());

        let fresh = detect(&mut db, user, Utc::now()).unwrap();
        assert_ne!(fresh.id, report.id);
        assert_eq!(latest(&db, user).map(|g| g.id), Some(fresh.id));
    }

    #[test]
    fn test_detect_unknown_user() {
        let mut db = Database::default();
        assert!(detect(&mut db, Uuid::new_v4(), Utc::now()).is_err());
    }
}
