//! シーン別のスタイリングガイドとスタイル決定ルール

use crate::types::{Mood, Occasion, StyleType};
use serde::{Deserialize, Serialize};

/// スタイリングガイド
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StylingGuide {
    pub title: String,
    pub tips: Vec<String>,
    #[serde(rename = "do")]
    pub dos: Vec<String>,
    pub dont: Vec<String>,
}

impl StylingGuide {
    fn new(title: &str, tips: &[&str], dos: &[&str], dont: &[&str]) -> Self {
        let owned = |v: &[&str]| -> Vec<String> { v.iter().map(|s| s.to_string()).collect() };
        Self {
            title: title.to_string(),
            tips: owned(tips),
            dos: owned(dos),
            dont: owned(dont),
        }
    }
}

/// シーンのガイド（ガイドが無いシーンは汎用ガイド）
pub fn styling_guide(occasion: Occasion) -> StylingGuide {
    match occasion {
        Occasion::Office => StylingGuide::new(
            "Office Styling Guide",
            &[
                "Choose professional, well-fitted clothing",
                "Stick to neutral colors or subtle patterns",
                "Ensure clothes are clean and wrinkle-free",
                "Wear comfortable yet professional footwear",
                "Keep accessories minimal and elegant",
            ],
            &[
                "Wear tailored pieces",
                "Choose appropriate length for skirts/dresses",
                "Layer with blazers or cardigans",
            ],
            &[
                "Avoid overly casual items",
                "Skip revealing or flashy clothing",
                "Avoid excessive accessories",
            ],
        ),
        Occasion::Party => StylingGuide::new(
            "Party Styling Guide",
            &[
                "Express your personality with bold choices",
                "Experiment with colors and patterns",
                "Add statement accessories",
                "Choose comfortable yet stylish footwear",
                "Consider the party theme",
            ],
            &[
                "Wear something that makes you feel confident",
                "Add sparkle or shine for evening parties",
                "Consider the venue and dress code",
            ],
            &["Don't overdress or underdress", "Avoid uncomfortable shoes for long parties"],
        ),
        Occasion::Wedding => StylingGuide::new(
            "Wedding Styling Guide",
            &[
                "Choose elegant and sophisticated pieces",
                "Avoid white (unless you're the bride)",
                "Consider the wedding theme and venue",
                "Wear comfortable shoes for dancing",
                "Add elegant accessories",
            ],
            &[
                "Dress appropriately for the wedding type",
                "Consider the season and weather",
                "Wear something you can move in comfortably",
            ],
            &[
                "Don't wear white to someone else's wedding",
                "Avoid overly casual attire",
                "Don't upstage the bride",
            ],
        ),
        Occasion::Interview => StylingGuide::new(
            "Interview Styling Guide",
            &[
                "Dress professionally and conservatively",
                "Choose well-fitted, clean clothing",
                "Stick to neutral colors",
                "Wear comfortable, professional shoes",
                "Keep accessories minimal",
            ],
            &[
                "Research the company dress code",
                "Ensure clothes are clean and pressed",
                "Wear something that makes you feel confident",
            ],
            &[
                "Avoid casual or flashy clothing",
                "Don't wear strong perfumes",
                "Avoid distracting accessories",
            ],
        ),
        Occasion::Festival => StylingGuide::new(
            "Festival Styling Guide",
            &[
                "Wear comfortable, weather-appropriate clothing",
                "Choose items you don't mind getting dirty",
                "Layer for changing temperatures",
                "Wear comfortable, closed-toe shoes",
                "Add fun accessories and colors",
            ],
            &[
                "Consider the weather forecast",
                "Wear sunscreen and hats",
                "Bring a light jacket or sweater",
            ],
            &["Avoid expensive or delicate items", "Don't wear uncomfortable shoes"],
        ),
        Occasion::Travel => StylingGuide::new(
            "Travel Styling Guide",
            &[
                "Choose comfortable, versatile pieces",
                "Layer for different climates",
                "Wear comfortable shoes for walking",
                "Pack items that mix and match",
                "Consider the destination culture",
            ],
            &[
                "Research the destination weather",
                "Pack versatile, wrinkle-resistant items",
                "Wear comfortable layers for flights",
            ],
            &["Avoid overpacking", "Don't wear uncomfortable shoes for long travel"],
        ),
        Occasion::Daily => StylingGuide::new(
            "Styling Guide",
            &["Choose clothing that makes you feel confident and comfortable"],
            &[],
            &[],
        ),
    }
}

/// シーン指定コーデのスタイル
///
/// 仕事系は Traditional、パーティー系は Attractive に固定し、
/// それ以外は指定スタイル（無ければ Casual）。
pub fn occasion_style(occasion: Occasion, requested: Option<StyleType>) -> StyleType {
    match occasion {
        Occasion::Office | Occasion::Interview => StyleType::Traditional,
        Occasion::Party | Occasion::Festival => StyleType::Attractive,
        _ => requested.unwrap_or(StyleType::Casual),
    }
}

/// デイリーコーデのシーン（予定の種別文字列から判定）
pub fn daily_occasion<S: AsRef<str>>(event_types: &[S]) -> Occasion {
    let types: Vec<String> = event_types.iter().map(|t| t.as_ref().to_lowercase()).collect();
    let has = |names: &[&str]| types.iter().any(|t| names.contains(&t.as_str()));

    if has(&["office", "meeting"]) {
        Occasion::Office
    } else if has(&["party", "celebration"]) {
        Occasion::Party
    } else if has(&["wedding"]) {
        Occasion::Wedding
    } else if has(&["travel"]) {
        Occasion::Travel
    } else {
        Occasion::Daily
    }
}

/// デイリーコーデのスタイル（気分とシーンから）
pub fn daily_style(mood: Mood, occasion: Occasion) -> StyleType {
    if mood == Mood::Professional || occasion == Occasion::Office {
        StyleType::Traditional
    } else if mood == Mood::Festive || occasion == Occasion::Party {
        StyleType::Attractive
    } else {
        StyleType::Casual
    }
}

/// 週間プランのスタイル
pub fn planner_style(occasion: Occasion) -> StyleType {
    if occasion == Occasion::Office {
        StyleType::Traditional
    } else {
        StyleType::Casual
    }
}

/// 予定の無い日のシーン（週末はパーティー）
pub fn weekday_occasion(is_weekend: bool) -> Occasion {
    if is_weekend {
        Occasion::Party
    } else {
        Occasion::Daily
    }
}
