//! シーン別コーデとスタイリングガイド

use crate::error::{Result, StyloError};
use crate::models::OutfitRecord;
use crate::services::outfits;
use crate::store::Database;
use chrono::{DateTime, Utc};
use rand::Rng;
use stylo_ai_common::occasion::occasion_style;
use stylo_ai_common::{styling_guide, Occasion, StyleType, StylingGuide};
use uuid::Uuid;

/// ガイドのあるシーンのみ受け付ける
pub fn guided_occasion(occasion: Occasion) -> Result<Occasion> {
    if Occasion::GUIDED.contains(&occasion) {
        Ok(occasion)
    } else {
        Err(StyloError::Validation("Invalid occasion".into()))
    }
}

pub fn generate<R: Rng + ?Sized>(
    db: &mut Database,
    user_id: Uuid,
    occasion: Occasion,
    requested: Option<StyleType>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<(OutfitRecord, StylingGuide)> {
    let occasion = guided_occasion(occasion)?;
    let style = occasion_style(occasion, requested);
    let outfit = outfits::create_outfit(db, user_id, style, Some(occasion), None, now, rng)?;
    Ok((outfit, styling_guide(occasion)))
}

/// 全ガイド（シーン名 → ガイド）
pub fn guides() -> Vec<(Occasion, StylingGuide)> {
    Occasion::GUIDED
        .iter()
        .map(|o| (*o, styling_guide(*o)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StoredImage, WardrobeRecord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use stylo_ai_common::Category;

    #[test]
    fn test_daily_has_no_guide() {
        assert!(guided_occasion(Occasion::Daily).is_err());
        assert_eq!(guides().len(), Occasion::GUIDED.len());
    }

    #[test]
    fn test_office_forces_traditional() {
        let mut db = Database::default();
        let user = Uuid::new_v4();
        db.wardrobe.push(WardrobeRecord {
            id: Uuid::new_v4(),
            user_id: user,
            category: Category::Dresses,
            color: "navy".into(),
            style_tags: vec!["formal".into()],
            image_url: "http://localhost/uploads/d.png".into(),
            storage: StoredImage::Local { file_name: "d.png".into() },
            created_at: Utc::now(),
        });

        let mut rng = StdRng::seed_from_u64(7);
        let (outfit, guide) = generate(&mut db, user, Occasion::Office, Some(StyleType::Casual), Utc::now(), &mut rng).unwrap();
        assert_eq!(outfit.style_type, StyleType::Traditional);
        assert_eq!(outfit.occasion, Some(Occasion::Office));
        assert!(!guide.tips.is_empty());
    }
}
