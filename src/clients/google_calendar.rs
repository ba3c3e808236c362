//! Google Calendar（OAuth2 + Events API）クライアント

use crate::config::GoogleCalendarConfig;
use crate::error::{Result, StyloError};
use crate::models::CalendarTokens;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use stylo_ai_common::{categorize_event, EventType};
use url::Url;

const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/calendar.events.readonly",
];

const MAX_EVENTS: &str = "50";

#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    config: GoogleCalendarConfig,
}

/// トークンエンドポイントの応答
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// 有効期間（秒）
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenGrant {
    /// 保存用トークンに変換（応答にリフレッシュトークンが無ければ以前のものを引き継ぐ）
    pub fn into_tokens(self, now: DateTime<Utc>, previous: Option<&CalendarTokens>) -> CalendarTokens {
        CalendarTokens {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
            expires_at: self.expires_in.map(|secs| now + chrono::Duration::seconds(secs)),
            connected_at: previous.map(|p| p.connected_at).unwrap_or(now),
        }
    }
}

/// コーデ計画用に整形した予定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: EventType,
}

impl CalendarEvent {
    /// 開始日（終日予定は日付、それ以外は予定のタイムゾーンでの日付）
    pub fn start_date(&self) -> Option<NaiveDate> {
        let start = self.start.as_deref()?;
        DateTime::parse_from_rfc3339(start)
            .map(|dt| dt.date_naive())
            .ok()
            .or_else(|| NaiveDate::parse_from_str(start, "%Y-%m-%d").ok())
    }
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    start: Option<EventTime>,
    #[serde(default)]
    end: Option<EventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

impl EventTime {
    fn value(self) -> Option<String> {
        self.date_time.or(self.date)
    }
}

impl From<RawEvent> for CalendarEvent {
    fn from(raw: RawEvent) -> Self {
        let kind = categorize_event(raw.summary.as_deref(), raw.description.as_deref());
        Self {
            id: raw.id,
            title: raw.summary.unwrap_or_else(|| "Untitled Event".to_string()),
            description: raw.description.unwrap_or_default(),
            start: raw.start.and_then(EventTime::value),
            end: raw.end.and_then(EventTime::value),
            location: raw.location.unwrap_or_default(),
            kind,
        }
    }
}

struct Credentials<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
}

impl GoogleCalendarClient {
    pub fn new(http: reqwest::Client, config: GoogleCalendarConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &GoogleCalendarConfig {
        &self.config
    }

    fn credentials(&self) -> Result<Credentials<'_>> {
        match (
            self.config.client_id.as_deref(),
            self.config.client_secret.as_deref(),
            self.config.redirect_uri.as_deref(),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Ok(Credentials {
                client_id,
                client_secret,
                redirect_uri,
            }),
            (client_id, client_secret, redirect_uri) => {
                let missing: Vec<&str> = [
                    ("GOOGLE_CALENDAR_CLIENT_ID", client_id.is_none()),
                    ("GOOGLE_CALENDAR_CLIENT_SECRET", client_secret.is_none()),
                    ("GOOGLE_CALENDAR_REDIRECT_URI", redirect_uri.is_none()),
                ]
                .into_iter()
                .filter(|(_, missing)| *missing)
                .map(|(name, _)| name)
                .collect();
                Err(StyloError::NotConfigured(format!(
                    "Google Calendar (missing: {})",
                    missing.join(", ")
                )))
            }
        }
    }

    /// 同意画面のURL（リフレッシュトークン取得のため毎回同意を求める）
    pub fn auth_url(&self, state: &str) -> Result<String> {
        let creds = self.credentials()?;
        let scope = SCOPES.join(" ");
        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", creds.client_id),
                ("redirect_uri", creds.redirect_uri),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| StyloError::Config(format!("invalid Google auth url: {}", e)))?;
        Ok(url.to_string())
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let creds = self.credentials()?;
        self.token_request(&[
            ("code", code),
            ("client_id", creds.client_id),
            ("client_secret", creds.client_secret),
            ("redirect_uri", creds.redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant> {
        let creds = self.credentials()?;
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("client_id", creds.client_id),
            ("client_secret", creds.client_secret),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenGrant> {
        let response = self.http.post(&self.config.token_url).form(params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StyloError::Upstream(format!(
                "Failed to exchange code for tokens ({}): {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// primary カレンダーの予定を開始時刻順に取得
    pub async fn list_events(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        let url = format!(
            "{}/calendars/primary/events",
            self.config.api_base.trim_end_matches('/')
        );
        let time_min = time_min.to_rfc3339();
        let time_max = time_max.to_rfc3339();

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", MAX_EVENTS),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StyloError::Upstream(format!(
                "Failed to fetch calendar events ({})",
                response.status()
            )));
        }

        let list: EventList = response.json().await?;
        Ok(list.items.into_iter().map(CalendarEvent::from).collect())
    }
}
