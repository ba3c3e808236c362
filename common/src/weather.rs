//! 天気の分類と服装アドバイス

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
}

impl WeatherCondition {
    /// OpenWeatherMap の `weather[0].main` を変換（未知の値は晴れ扱い）
    pub fn from_openweathermap(main: &str) -> Self {
        match main {
            "Clear" => WeatherCondition::Sunny,
            "Clouds" | "Mist" | "Fog" | "Haze" => WeatherCondition::Cloudy,
            "Rain" | "Drizzle" | "Thunderstorm" => WeatherCondition::Rainy,
            "Snow" => WeatherCondition::Snowy,
            _ => WeatherCondition::Sunny,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "sunny",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Snowy => "snowy",
        }
    }
}

/// 天気情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub temperature: i32,
    pub condition: WeatherCondition,
    pub humidity: u32,
    pub wind_speed: f64,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl Default for Weather {
    /// API未設定・失敗時の天気（25℃・晴れ）
    fn default() -> Self {
        Self {
            temperature: 25,
            condition: WeatherCondition::Sunny,
            humidity: 60,
            wind_speed: 5.0,
            description: "Clear sky".to_string(),
            icon: "01d".to_string(),
            city: None,
        }
    }
}

/// 天気に応じたアドバイス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecommendation {
    pub message: String,
    pub suggestions: Vec<String>,
}

pub fn recommendations(condition: WeatherCondition) -> WeatherRecommendation {
    match condition {
        WeatherCondition::Sunny => recommendation(
            "Sunny day! Wear light, breathable fabrics.",
            &["Light colors", "Sunglasses", "Hat", "Sunscreen"],
        ),
        WeatherCondition::Rainy => recommendation(
            "Rainy weather! Stay dry and comfortable.",
            &["Waterproof jacket", "Umbrella", "Boots", "Layers"],
        ),
        WeatherCondition::Cloudy => recommendation(
            "Cloudy day! Perfect for layered outfits.",
            &["Light layers", "Comfortable shoes", "Versatile pieces"],
        ),
        WeatherCondition::Snowy => recommendation(
            "Cold weather! Bundle up and stay warm.",
            &["Warm layers", "Winter coat", "Boots", "Gloves"],
        ),
    }
}

fn recommendation(message: &str, suggestions: &[&str]) -> WeatherRecommendation {
    WeatherRecommendation {
        message: message.to_string(),
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
    }
}
