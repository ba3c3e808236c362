//! 今日のコーデ

use crate::error::{Result, StyloError};
use crate::models::{DailyOutfitRecord, EventRef, OutfitRecord};
use crate::services::outfits;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use stylo_ai_common::occasion::{daily_occasion, daily_style};
use stylo_ai_common::weather::{recommendations, WeatherRecommendation};
use stylo_ai_common::{Mood, Weather};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct DailyRequest {
    pub mood: Option<Mood>,
    pub city: Option<String>,
    pub calendar_events: Vec<EventRef>,
    pub regenerate: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyResult {
    pub daily_outfit: DailyOutfitRecord,
    pub outfit: Option<OutfitRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_recommendations: Option<WeatherRecommendation>,
    pub message: String,
}

/// 今日の記録とそのコーデ
pub async fn today(state: &AppState, user_id: Uuid, now: DateTime<Utc>) -> Option<(DailyOutfitRecord, Option<OutfitRecord>)> {
    let date = now.date_naive();
    state
        .store
        .read(|db| {
            let daily = db
                .daily_outfits
                .iter()
                .find(|d| d.user_id == user_id && d.date == date)?
                .clone();
            let outfit = db.outfit(user_id, daily.outfit_id).cloned();
            Some((daily, outfit))
        })
        .await
}

/// 今日のコーデを生成する（生成済みなら `regenerate` 指定時のみ作り直す）
pub async fn generate_today(
    state: &AppState,
    user_id: Uuid,
    request: DailyRequest,
    now: DateTime<Utc>,
) -> Result<DailyResult> {
    if !request.regenerate {
        if let Some((daily_outfit, outfit)) = today(state, user_id, now).await {
            return Ok(DailyResult {
                daily_outfit,
                outfit,
                weather: None,
                weather_recommendations: None,
                message: "Today's outfit already generated".to_string(),
            });
        }
    }

    let weather = match request.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(city) => Some(state.weather.by_city(city).await),
        None => None,
    };

    let event_types: Vec<String> = request
        .calendar_events
        .iter()
        .filter_map(|e| e.kind.clone())
        .collect();
    let occasion = daily_occasion(&event_types);
    let mood = request.mood.unwrap_or_default();
    let style = daily_style(mood, occasion);
    let condition = weather
        .as_ref()
        .map(|w| w.condition)
        .unwrap_or_default();
    let date = now.date_naive();

    let (daily_outfit, outfit) = state
        .store
        .write(|db| {
            let mut rng = StdRng::from_os_rng();
            let outfit = outfits::create_outfit(
                db,
                user_id,
                style,
                Some(occasion),
                Some(condition.as_str().to_string()),
                now,
                &mut rng,
            )?;

            // 1ユーザー1日1件
            db.daily_outfits.retain(|d| !(d.user_id == user_id && d.date == date));

            let daily = DailyOutfitRecord {
                id: Uuid::new_v4(),
                user_id,
                date,
                outfit_id: outfit.id,
                weather: weather.clone(),
                calendar_events: request.calendar_events.clone(),
                user_mood: mood,
                occasion,
                style_type: style,
                is_worn: false,
                worn_at: None,
                rating: None,
                notes: None,
                created_at: now,
            };
            db.daily_outfits.push(daily.clone());
            Ok((daily, outfit))
        })
        .await?;

    tracing::info!(%user_id, %date, occasion = %occasion, style = %style, "daily outfit generated");

    Ok(DailyResult {
        daily_outfit,
        outfit: Some(outfit),
        weather_recommendations: weather.as_ref().map(|w| recommendations(w.condition)),
        weather,
        message: "Today's outfit generated successfully".to_string(),
    })
}

/// 着用済みにする（評価は1〜5）
pub async fn mark_worn(
    state: &AppState,
    user_id: Uuid,
    daily_id: Uuid,
    rating: Option<u8>,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> Result<DailyOutfitRecord> {
    if let Some(r) = rating {
        if !(1..=5).contains(&r) {
            return Err(StyloError::Validation("Rating must be between 1 and 5".into()));
        }
    }

    state
        .store
        .write(|db| {
            let daily = db
                .daily_outfits
                .iter_mut()
                .find(|d| d.id == daily_id && d.user_id == user_id)
                .ok_or_else(|| StyloError::NotFound("Daily outfit not found".into()))?;

            daily.is_worn = true;
            daily.worn_at = Some(now);
            if rating.is_some() {
                daily.rating = rating;
            }
            if let Some(notes) = notes.filter(|n| !n.is_empty()) {
                daily.notes = Some(notes);
            }
            Ok(daily.clone())
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{StoredImage, WardrobeRecord};
    use crate::store::Store;
    use stylo_ai_common::{Category, Occasion, StyleType};

    async fn state_with_wardrobe(user_id: Uuid) -> AppState {
        let state = AppState::new(Config::default(), Store::in_memory()).unwrap();
        state
            .store
            .write(|db| {
                for (category, color) in [(Category::Tops, "white"), (Category::Bottoms, "navy")] {
                    let id = Uuid::new_v4();
                    db.wardrobe.push(WardrobeRecord {
                        id,
                        user_id,
                        category,
                        color: color.into(),
                        style_tags: Vec::new(),
                        image_url: format!("http://localhost/uploads/{}.png", id),
                        storage: StoredImage::Local { file_name: format!("{}.png", id) },
                        created_at: Utc::now(),
                    });
                }
                Ok(())
            })
            .await
            .unwrap();
        state
    }

    fn event(kind: &str) -> EventRef {
        EventRef {
            kind: Some(kind.to_string()),
            title: None,
            time: None,
        }
    }

    #[tokio::test]
    async fn test_generate_today_reuses_until_regenerate() {
        let user = Uuid::new_v4();
        let state = state_with_wardrobe(user).await;
        let now = Utc::now();

        let first = generate_today(&state, user, DailyRequest::default(), now).await.unwrap();
        let again = generate_today(&state, user, DailyRequest::default(), now).await.unwrap();
        assert_eq!(again.daily_outfit.id, first.daily_outfit.id);
        assert_eq!(again.message, "Today's outfit already generated");

        let regenerated = generate_today(
            &state,
            user,
            DailyRequest { regenerate: true, ..DailyRequest::default() },
            now,
        )
        .await
        .unwrap();
        assert_ne!(regenerated.daily_outfit.id, first.daily_outfit.id);

        // 1ユーザー1日1件のまま
        let count = state
            .store
            .read(|db| db.daily_outfits.iter().filter(|d| d.user_id == user).count())
            .await;
        assert_eq!(count, 1);

        let (today_record, outfit) = today(&state, user, now).await.unwrap();
        assert_eq!(today_record.id, regenerated.daily_outfit.id);
        assert_eq!(outfit.map(|o| o.id), regenerated.outfit.map(|o| o.id));
    }

    #[tokio::test]
    async fn test_generate_today_occasion_and_style() {
        let user = Uuid::new_v4();
        let state = state_with_wardrobe(user).await;

        let meeting = DailyRequest {
            calendar_events: vec![event("Meeting")],
            ..DailyRequest::default()
        };
        let result = generate_today(&state, user, meeting, Utc::now()).await.unwrap();
        assert_eq!(result.daily_outfit.occasion, Occasion::Office);
        assert_eq!(result.daily_outfit.style_type, StyleType::Traditional);

        let festive = DailyRequest {
            mood: Some(Mood::Festive),
            regenerate: true,
            ..DailyRequest::default()
        };
        let result = generate_today(&state, user, festive, Utc::now()).await.unwrap();
        assert_eq!(result.daily_outfit.occasion, Occasion::Daily);
        assert_eq!(result.daily_outfit.style_type, StyleType::Attractive);
        assert!(result.weather.is_none());
    }

    #[tokio::test]
    async fn test_mark_worn_validates_rating_and_owner() {
        let user = Uuid::new_v4();
        let state = state_with_wardrobe(user).await;
        let daily = generate_today(&state, user, DailyRequest::default(), Utc::now())
            .await
            .unwrap()
            .daily_outfit;

        assert!(matches!(
            mark_worn(&state, user, daily.id, Some(9), None, Utc::now()).await,
            Err(StyloError::Validation(_))
        ));
        assert!(matches!(
            mark_worn(&state, Uuid::new_v4(), daily.id, Some(4), None, Utc::now()).await,
            Err(StyloError::NotFound(_))
        ));

        let worn = mark_worn(&state, user, daily.id, Some(4), Some("nice".into()), Utc::now())
            .await
            .unwrap();
        assert!(worn.is_worn);
        assert_eq!(worn.rating, Some(4));
        assert_eq!(worn.notes.as_deref(), Some("nice"));
    }
}
