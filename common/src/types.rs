//! ドメイン型定義
//!
//! サーバーとCLIで共有される型:
//! - Category / StyleType / Occasion: 列挙値（JSON上は元の表記のまま）
//! - WardrobeItem: コーデ生成の入力となるアイテム
//! - OutfitItem / OutfitSelection: コーデ生成の出力

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// アイテムのカテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Tops,
    Bottoms,
    Dresses,
    Footwear,
    Accessories,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Tops,
        Category::Bottoms,
        Category::Dresses,
        Category::Footwear,
        Category::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tops => "Tops",
            Category::Bottoms => "Bottoms",
            Category::Dresses => "Dresses",
            Category::Footwear => "Footwear",
            Category::Accessories => "Accessories",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_string()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// コーデのスタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleType {
    Casual,
    Attractive,
    Traditional,
    #[serde(rename = "Trend Aligned")]
    TrendAligned,
}

impl StyleType {
    pub const ALL: [StyleType; 4] = [
        StyleType::Casual,
        StyleType::Attractive,
        StyleType::Traditional,
        StyleType::TrendAligned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleType::Casual => "Casual",
            StyleType::Attractive => "Attractive",
            StyleType::Traditional => "Traditional",
            StyleType::TrendAligned => "Trend Aligned",
        }
    }

    /// スタイルタグ照合用のキーワード
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            StyleType::Casual => &["casual", "comfortable", "relaxed"],
            StyleType::Attractive => &["sexy", "attractive", "stylish"],
            StyleType::Traditional => &["traditional", "classic", "formal"],
            StyleType::TrendAligned => &["trendy", "fashionable", "modern"],
        }
    }
}

impl FromStr for StyleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StyleType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidStyleType(s.to_string()))
    }
}

impl std::fmt::Display for StyleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 着用シーン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Occasion {
    Office,
    Party,
    Daily,
    Wedding,
    Travel,
    Interview,
    Festival,
}

impl Occasion {
    pub const ALL: [Occasion; 7] = [
        Occasion::Office,
        Occasion::Party,
        Occasion::Daily,
        Occasion::Wedding,
        Occasion::Travel,
        Occasion::Interview,
        Occasion::Festival,
    ];

    /// スタイリングガイドを持つシーン（表示順）
    pub const GUIDED: [Occasion; 6] = [
        Occasion::Office,
        Occasion::Party,
        Occasion::Wedding,
        Occasion::Interview,
        Occasion::Festival,
        Occasion::Travel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Occasion::Office => "Office",
            Occasion::Party => "Party",
            Occasion::Daily => "Daily",
            Occasion::Wedding => "Wedding",
            Occasion::Travel => "Travel",
            Occasion::Interview => "Interview",
            Occasion::Festival => "Festival",
        }
    }
}

impl FromStr for Occasion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Occasion::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| Error::InvalidOccasion(s.to_string()))
    }
}

impl std::fmt::Display for Occasion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ユーザーの気分（デイリーコーデ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Energetic,
    Relaxed,
    Professional,
    #[default]
    Casual,
    Festive,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Energetic,
        Mood::Relaxed,
        Mood::Professional,
        Mood::Casual,
        Mood::Festive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Energetic => "energetic",
            Mood::Relaxed => "relaxed",
            Mood::Professional => "professional",
            Mood::Casual => "casual",
            Mood::Festive => "festive",
        }
    }

    /// 大文字小文字を区別せずに解釈する（不明な値は None）
    pub fn parse_lenient(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Mood::ALL.into_iter().find(|m| m.as_str() == lower)
    }
}

/// 優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// コーデ生成の入力となるアイテム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    pub id: Uuid,

    pub category: Category,

    #[serde(default)]
    pub color: String,

    #[serde(default)]
    pub style_tags: Vec<String>,

    #[serde(default)]
    pub image_url: String,
}

impl WardrobeItem {
    pub fn new(category: Category, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            color: color.into(),
            style_tags: Vec::new(),
            image_url: String::new(),
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.style_tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// コーデに含まれるアイテムへの参照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitItem {
    pub wardrobe_id: Uuid,
    pub category: Category,
    #[serde(default)]
    pub image_url: String,
}

impl From<&WardrobeItem> for OutfitItem {
    fn from(item: &WardrobeItem) -> Self {
        Self {
            wardrobe_id: item.id,
            category: item.category,
            image_url: item.image_url.clone(),
        }
    }
}

/// コーデ生成結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitSelection {
    /// メインアイテム（トップス+ボトムス、またはワンピース）
    pub items: Vec<OutfitItem>,

    pub shoes: Option<OutfitItem>,

    pub accessories: Vec<OutfitItem>,

    pub hairstyle_suggestion: String,

    /// 直近に着用したコーデと同じ組み合わせの場合、そのコーデID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recently_worn: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("Tops".parse::<Category>().unwrap(), Category::Tops);
        assert_eq!("Accessories".parse::<Category>().unwrap(), Category::Accessories);
        assert!("tops".parse::<Category>().is_err());
        assert!("Hats".parse::<Category>().is_err());
    }

    #[test]
    fn test_style_type_serialize_trend_aligned() {
        let json = serde_json::to_string(&StyleType::TrendAligned).unwrap();
        assert_eq!(json, "\"Trend Aligned\"");

        let parsed: StyleType = serde_json::from_str("\"Trend Aligned\"").unwrap();
        assert_eq!(parsed, StyleType::TrendAligned);
        assert_eq!("Trend Aligned".parse::<StyleType>().unwrap(), StyleType::TrendAligned);
    }

    #[test]
    fn test_style_type_rejects_unknown() {
        // 旧クライアントが送る "Professional" は受け付けない
        let err = "Professional".parse::<StyleType>().unwrap_err();
        assert!(matches!(err, Error::InvalidStyleType(_)));
    }

    #[test]
    fn test_mood_parse_lenient() {
        assert_eq!(Mood::parse_lenient(" Festive "), Some(Mood::Festive));
        assert_eq!(Mood::parse_lenient("sleepy"), None);
        assert_eq!(serde_json::to_string(&Mood::Professional).unwrap(), "\"professional\"");
    }

    #[test]
    fn test_occasion_parse() {
        assert_eq!("Interview".parse::<Occasion>().unwrap(), Occasion::Interview);
        assert!("Picnic".parse::<Occasion>().is_err());
    }

    #[test]
    fn test_mood_lowercase() {
        let mood: Mood = serde_json::from_str("\"festive\"").unwrap();
        assert_eq!(mood, Mood::Festive);
        assert_eq!(Mood::default(), Mood::Casual);
    }

    #[test]
    fn test_wardrobe_item_deserialize_missing_fields() {
        let json = r#"{"id": "67e55044-10b1-426f-9247-bb680e5fe0c8", "category": "Footwear"}"#;
        let item: WardrobeItem = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(item.category, Category::Footwear);
        assert_eq!(item.color, "");
        assert!(item.style_tags.is_empty());
    }

    #[test]
    fn test_outfit_selection_serialize_camel_case() {
        let top = WardrobeItem::new(Category::Tops, "white");
        let selection = OutfitSelection {
            items: vec![OutfitItem::from(&top)],
            hairstyle_suggestion: "Neat bun".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&selection).unwrap();
        assert!(json.contains("\"wardrobeId\""));
        assert!(json.contains("\"hairstyleSuggestion\":\"Neat bun\""));
        assert!(!json.contains("recentlyWorn"));
    }
}
