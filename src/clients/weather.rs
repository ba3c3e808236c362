//! OpenWeatherMap クライアント
//!
//! APIキー未設定・呼び出し失敗時は既定の天気（25℃・晴れ）を返す。

use crate::config::WeatherConfig;
use crate::error::{Result, StyloError};
use serde::Deserialize;
use stylo_ai_common::{Weather, WeatherCondition};

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    config: WeatherConfig,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    weather: Vec<WeatherEntry>,
    main: MainReadings,
    #[serde(default)]
    wind: Option<Wind>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherEntry {
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: u32,
}

#[derive(Debug, Deserialize)]
struct Wind {
    #[serde(default)]
    speed: f64,
}

impl WeatherClient {
    pub fn new(http: reqwest::Client, config: WeatherConfig) -> Self {
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// 都市名で現在の天気を取得
    pub async fn by_city(&self, city: &str) -> Weather {
        let Some(api_key) = &self.config.api_key else {
            tracing::debug!("weather api key not configured, using default weather");
            return Weather::default();
        };

        match self.fetch(city, api_key).await {
            Ok(weather) => weather,
            Err(e) => {
                tracing::warn!(city, error = %e, "weather lookup failed, using default weather");
                Weather::default()
            }
        }
    }

    async fn fetch(&self, city: &str, api_key: &str) -> Result<Weather> {
        let url = format!("{}/weather", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StyloError::Upstream(format!(
                "OpenWeatherMap returned {}",
                response.status()
            )));
        }

        let body: CurrentWeather = response.json().await?;
        convert(body)
    }
}

fn convert(body: CurrentWeather) -> Result<Weather> {
    let entry = body
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| StyloError::Upstream("OpenWeatherMap response has no weather entry".into()))?;

    Ok(Weather {
        temperature: body.main.temp.round() as i32,
        condition: WeatherCondition::from_openweathermap(&entry.main),
        humidity: body.main.humidity,
        wind_speed: body.wind.map(|w| w.speed).unwrap_or(0.0),
        description: entry.description,
        icon: entry.icon,
        city: body.name,
    })
}
