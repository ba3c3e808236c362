//! 週間プラン

use crate::error::{Result, StyloError};
use crate::models::{OutfitRecord, PlannedDay, PlannerRecord};
use crate::services::{calendar, outfits};
use crate::state::AppState;
use crate::store::Database;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use stylo_ai_common::occasion::{planner_style, weekday_occasion};
use stylo_ai_common::{EventType, Occasion};
use uuid::Uuid;

pub const DAYS_PER_WEEK: i64 = 7;

#[derive(Debug, Clone)]
pub struct WeekRequest {
    pub week_start: NaiveDate,
    pub city: Option<String>,
    pub regenerate: bool,
}

/// プランと各日のコーデ
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPlan {
    pub planner: PlannerRecord,
    pub outfits: Vec<OutfitRecord>,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 1日分のシーンを決める（予定があれば予定、無ければ曜日）
pub fn day_occasion(event: Option<EventType>, date: NaiveDate) -> Occasion {
    match event {
        Some(kind) => kind.planner_occasion().unwrap_or(Occasion::Daily),
        None => weekday_occasion(is_weekend(date)),
    }
}

fn active_plan(db: &Database, user_id: Uuid, week_start: NaiveDate) -> Option<&PlannerRecord> {
    db.planners
        .iter()
        .filter(|p| p.user_id == user_id && p.is_active && p.starts_within_week(week_start))
        .max_by_key(|p| p.updated_at)
}

fn with_outfits(db: &Database, planner: PlannerRecord) -> WeekPlan {
    let outfits = planner
        .outfits
        .iter()
        .filter_map(|day| db.outfit(planner.user_id, day.outfit_id).cloned())
        .collect();
    WeekPlan { planner, outfits }
}

/// 週間プランを生成する（既存プランは `regenerate` 指定時のみ作り直す）
pub async fn generate_week(
    state: &AppState,
    user_id: Uuid,
    request: WeekRequest,
    now: DateTime<Utc>,
) -> Result<WeekPlan> {
    let week_start = request.week_start;

    if !request.regenerate {
        let existing = state
            .store
            .read(|db| active_plan(db, user_id, week_start).cloned().map(|p| with_outfits(db, p)))
            .await;
        if let Some(plan) = existing {
            return Ok(plan);
        }
    }

    let events = if calendar::is_connected(state, user_id).await {
        match calendar::week_events(state, user_id, week_start).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "calendar events unavailable, planning without them");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let weather = match request.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(city) => Some(state.weather.by_city(city).await),
        None => None,
    };
    let weather_label = weather.as_ref().map(|w| w.condition.as_str().to_string());

    let plan = state
        .store
        .write(|db| {
            let mut rng = StdRng::from_os_rng();
            let mut days = Vec::with_capacity(DAYS_PER_WEEK as usize);

            for offset in 0..DAYS_PER_WEEK {
                let date = week_start + Duration::days(offset);
                let event_type = calendar::first_event_on(&events, date).map(|e| e.kind);
                let occasion = day_occasion(event_type, date);

                let outfit = outfits::create_outfit(
                    db,
                    user_id,
                    planner_style(occasion),
                    Some(occasion),
                    weather_label.clone(),
                    now,
                    &mut rng,
                )?;

                days.push(PlannedDay {
                    date,
                    outfit_id: outfit.id,
                    occasion: Some(occasion),
                    event_type,
                    weather: weather.clone(),
                    is_confirmed: false,
                    is_recently_worn: outfit.recently_worn.is_some(),
                });
            }

            let existing_id = active_plan(db, user_id, week_start).map(|p| p.id);
            let planner = match existing_id.and_then(|id| db.planners.iter_mut().find(|p| p.id == id)) {
                Some(planner) => {
                    planner.outfits = days;
                    planner.updated_at = now;
                    planner.clone()
                }
                None => {
                    let planner = PlannerRecord {
                        id: Uuid::new_v4(),
                        user_id,
                        week_start_date: week_start,
                        week_end_date: week_start + Duration::days(DAYS_PER_WEEK - 1),
                        outfits: days,
                        is_active: true,
                        created_at: now,
                        updated_at: now,
                    };
                    db.planners.push(planner.clone());
                    planner
                }
            };

            Ok(with_outfits(db, planner))
        })
        .await?;

    tracing::info!(%user_id, %week_start, events = events.len(), "weekly plan generated");
    Ok(plan)
}

/// 指定週のプラン（無ければ None）
pub async fn get_week(state: &AppState, user_id: Uuid, week_start: NaiveDate) -> Option<WeekPlan> {
    state
        .store
        .read(|db| active_plan(db, user_id, week_start).cloned().map(|p| with_outfits(db, p)))
        .await
}

/// 1日分のコーデを確定する（その日が無ければ追加）
pub async fn confirm(
    state: &AppState,
    user_id: Uuid,
    planner_id: Uuid,
    date: NaiveDate,
    outfit_id: Uuid,
    now: DateTime<Utc>,
) -> Result<PlannerRecord> {
    state
        .store
        .write(|db| {
            if db.outfit(user_id, outfit_id).is_none() {
                return Err(StyloError::NotFound("Outfit not found".into()));
            }

            let planner = db
                .planners
                .iter_mut()
                .find(|p| p.id == planner_id && p.user_id == user_id)
                .ok_or_else(|| StyloError::NotFound("Planner not found".into()))?;

            match planner.outfits.iter_mut().find(|d| d.date == date) {
                Some(day) => {
                    day.outfit_id = outfit_id;
                    day.is_confirmed = true;
                }
                None => planner.outfits.push(PlannedDay {
                    date,
                    outfit_id,
                    occasion: None,
                    event_type: None,
                    weather: None,
                    is_confirmed: true,
                    is_recently_worn: false,
                }),
            }
            planner.updated_at = now;
            Ok(planner.clone())
        })
        .await
}
