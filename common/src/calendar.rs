//! カレンダー予定の分類
//!
//! 予定のタイトルと説明文から、コーデ選びに使う種別を判定する。

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Occasion;

/// 予定の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Office,
    Party,
    Travel,
    Fitness,
    Casual,
    #[default]
    Other,
}

impl EventType {
    /// 週間プランで使うシーン（対応が無い種別は None）
    pub fn planner_occasion(&self) -> Option<Occasion> {
        match self {
            EventType::Office => Some(Occasion::Office),
            EventType::Party => Some(Occasion::Party),
            EventType::Travel => Some(Occasion::Travel),
            _ => None,
        }
    }
}

lazy_static! {
    // 判定順に並べる（先に一致したものが優先）
    static ref EVENT_PATTERNS: Vec<(EventType, Regex)> = vec![
        (
            EventType::Office,
            Regex::new(r"\b(meeting|office|work|conference|presentation|interview|client|business)\b").unwrap(),
        ),
        (
            EventType::Party,
            Regex::new(r"\b(party|celebration|birthday|anniversary|wedding|reception|dinner|night out)\b").unwrap(),
        ),
        (
            EventType::Travel,
            Regex::new(r"\b(travel|trip|vacation|flight|hotel|journey|tour)\b").unwrap(),
        ),
        (
            EventType::Fitness,
            Regex::new(r"\b(gym|workout|exercise|fitness|yoga|running|sports)\b").unwrap(),
        ),
        (
            EventType::Casual,
            Regex::new(r"\b(lunch|coffee|casual|hangout|friends)\b").unwrap(),
        ),
    ];
}

/// 予定を分類する
///
/// タイトルが無い予定は Other。
pub fn categorize_event(title: Option<&str>, description: Option<&str>) -> EventType {
    let title = match title {
        Some(t) if !t.is_empty() => t,
        _ => return EventType::Other,
    };
    let combined = format!("{} {}", title, description.unwrap_or("")).to_lowercase();

    EVENT_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(&combined))
        .map(|(kind, _)| *kind)
        .unwrap_or_default()
}
