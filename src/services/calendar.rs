//! カレンダー連携（トークン保存・更新と予定取得）

use crate::clients::CalendarEvent;
use crate::error::{Result, StyloError};
use crate::models::CalendarTokens;
use crate::state::AppState;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

/// 認可コードをトークンに交換して保存
pub async fn connect(state: &AppState, user_id: Uuid, code: &str) -> Result<()> {
    let grant = state.calendar.exchange_code(code).await?;
    let now = Utc::now();

    state
        .store
        .write(|db| {
            let user = db.user_mut(user_id)?;
            user.calendar = Some(grant.into_tokens(now, user.calendar.as_ref()));
            Ok(())
        })
        .await?;

    tracing::info!(%user_id, "google calendar connected");
    Ok(())
}

pub async fn disconnect(state: &AppState, user_id: Uuid) -> Result<()> {
    state
        .store
        .write(|db| {
            db.user_mut(user_id)?.calendar = None;
            Ok(())
        })
        .await
}

pub async fn is_connected(state: &AppState, user_id: Uuid) -> bool {
    state
        .store
        .read(|db| db.user(user_id).is_some_and(|u| u.calendar.is_some()))
        .await
}

/// 有効なアクセストークン（期限切れなら更新して保存）
async fn access_token(state: &AppState, user_id: Uuid) -> Result<String> {
    let tokens: CalendarTokens = state
        .store
        .read(|db| db.user(user_id).and_then(|u| u.calendar.clone()))
        .await
        .ok_or_else(|| StyloError::Validation("Google Calendar not connected".into()))?;

    let now = Utc::now();
    if !tokens.is_expired(now) {
        return Ok(tokens.access_token);
    }

    let refresh_token = tokens
        .refresh_token
        .as_deref()
        .ok_or_else(|| StyloError::Unauthorized("Google Calendar token expired, please reconnect".into()))?;

    tracing::debug!(%user_id, "refreshing google calendar token");
    let grant = state.calendar.refresh(refresh_token).await?;
    let refreshed = grant.into_tokens(now, Some(&tokens));
    let access = refreshed.access_token.clone();

    state
        .store
        .write(|db| {
            db.user_mut(user_id)?.calendar = Some(refreshed);
            Ok(())
        })
        .await?;

    Ok(access)
}

pub async fn events_between(
    state: &AppState,
    user_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<CalendarEvent>> {
    let token = access_token(state, user_id).await?;
    state.calendar.list_events(&token, from, to).await
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// 今日の予定
pub async fn today_events(state: &AppState, user_id: Uuid, today: NaiveDate) -> Result<Vec<CalendarEvent>> {
    let from = start_of(today);
    events_between(state, user_id, from, from + Duration::days(1)).await
}

/// 週の予定（開始日から7日間）
pub async fn week_events(state: &AppState, user_id: Uuid, week_start: NaiveDate) -> Result<Vec<CalendarEvent>> {
    let from = start_of(week_start);
    events_between(state, user_id, from, from + Duration::days(7)).await
}

/// 日付ごとに最初の予定を引く
pub fn first_event_on(events: &[CalendarEvent], date: NaiveDate) -> Option<&CalendarEvent> {
    events.iter().find(|e| e.start_date() == Some(date))
}
