//! ワードローブの不足アイテム検出
//!
//! カテゴリごとの所持数を固定の閾値と比較し、足りないものを
//! 優先度・おすすめ色・ショッピングリンク付きで返す。

use crate::color::is_neutral;
use crate::types::{Category, Occasion, Priority, WardrobeItem};
use serde::{Deserialize, Serialize};
use url::Url;

/// 検索先のショッピングサイト
const SHOPPING_PLATFORMS: &[(&str, Platform)] = &[
    ("Amazon", Platform::Query("https://www.amazon.in/s", "k")),
    ("Flipkart", Platform::Query("https://www.flipkart.com/search", "q")),
    ("Myntra", Platform::Path("https://www.myntra.com/")),
    ("Ajio", Platform::Query("https://www.ajio.com/search/", "text")),
];

enum Platform {
    /// クエリパラメータで検索語を渡す
    Query(&'static str, &'static str),
    /// パスに検索語を埋め込む
    Path(&'static str),
}

/// ショッピングリンク
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingLink {
    pub platform: String,
    pub url: String,
    pub price: Option<f64>,
    pub currency: String,
}

/// 不足アイテム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingItem {
    pub category: Category,
    pub item_name: String,
    pub description: String,
    pub priority: Priority,
    pub suggested_colors: Vec<String>,
    pub shopping_links: Vec<ShoppingLink>,
}

#[derive(Debug, Default)]
struct CategoryCounts {
    tops: usize,
    bottoms: usize,
    dresses: usize,
    footwear: usize,
    accessories: usize,
}

impl CategoryCounts {
    fn of(items: &[WardrobeItem]) -> Self {
        let mut counts = Self::default();
        for item in items {
            match item.category {
                Category::Tops => counts.tops += 1,
                Category::Bottoms => counts.bottoms += 1,
                Category::Dresses => counts.dresses += 1,
                Category::Footwear => counts.footwear += 1,
                Category::Accessories => counts.accessories += 1,
            }
        }
        counts
    }
}

/// 不足アイテムを検出
///
/// `occasions` はユーザーがプロフィールで選んだ着用シーン。
pub fn detect_gaps(items: &[WardrobeItem], occasions: &[Occasion]) -> Vec<MissingItem> {
    let counts = CategoryCounts::of(items);
    let colors = distinct_colors(items);
    let mut missing = Vec::new();

    if counts.tops < 3 {
        missing.push(MissingItem {
            category: Category::Tops,
            item_name: "Basic Tops".to_string(),
            description: format!(
                "You have {} top(s). Consider adding versatile tops for different occasions.",
                counts.tops
            ),
            priority: if counts.tops == 0 { Priority::High } else { Priority::Medium },
            suggested_colors: suggested_colors(&colors, &["white", "black", "navy", "beige"]),
            shopping_links: shopping_links(Category::Tops, ""),
        });
    }

    if counts.bottoms < 2 {
        missing.push(MissingItem {
            category: Category::Bottoms,
            item_name: "Basic Bottoms".to_string(),
            description: format!(
                "You have {} bottom(s). Add versatile bottoms for different styles.",
                counts.bottoms
            ),
            priority: if counts.bottoms == 0 { Priority::High } else { Priority::Medium },
            suggested_colors: suggested_colors(&colors, &["black", "navy", "beige", "denim"]),
            shopping_links: shopping_links(Category::Bottoms, ""),
        });
    }

    if counts.footwear < 1 {
        missing.push(MissingItem {
            category: Category::Footwear,
            item_name: "Versatile Footwear".to_string(),
            description: "Add footwear to complete your outfits. Consider versatile options that work with multiple styles.".to_string(),
            priority: Priority::High,
            suggested_colors: owned(&["black", "brown", "white"]),
            shopping_links: shopping_links(Category::Footwear, ""),
        });
    }

    if occasions.contains(&Occasion::Office) && counts.tops < 5 {
        missing.push(MissingItem {
            category: Category::Tops,
            item_name: "Professional Tops".to_string(),
            description: "Add more professional tops for office occasions.".to_string(),
            priority: Priority::Medium,
            suggested_colors: owned(&["white", "navy", "black", "gray"]),
            shopping_links: shopping_links(Category::Tops, "Office"),
        });
    }

    if occasions.contains(&Occasion::Party) && counts.dresses < 2 {
        missing.push(MissingItem {
            category: Category::Dresses,
            item_name: "Party Dresses".to_string(),
            description: "Add party dresses for special occasions.".to_string(),
            priority: Priority::Low,
            suggested_colors: owned(&["black", "red", "blue", "green"]),
            shopping_links: shopping_links(Category::Dresses, "Party"),
        });
    }

    if counts.accessories < 3 {
        missing.push(MissingItem {
            category: Category::Accessories,
            item_name: "Versatile Accessories".to_string(),
            description: "Add accessories to enhance your outfits. Consider belts, bags, jewelry, and scarves.".to_string(),
            priority: Priority::Low,
            suggested_colors: owned(&["black", "brown", "gold", "silver"]),
            shopping_links: shopping_links(Category::Accessories, ""),
        });
    }

    if !items.is_empty() && !colors.iter().any(|c| is_neutral(c)) {
        missing.push(MissingItem {
            category: Category::Tops,
            item_name: "Neutral Basics".to_string(),
            description: "Add neutral-colored basics that can be paired with any outfit.".to_string(),
            priority: Priority::Medium,
            suggested_colors: owned(&["black", "white", "navy", "beige"]),
            shopping_links: shopping_links(Category::Tops, "Basics"),
        });
    }

    missing
}

/// おすすめ色: 手持ちの色（先頭2色）+ 既定色（先頭2色）、重複なし
pub fn suggested_colors(wardrobe_colors: &[String], defaults: &[&str]) -> Vec<String> {
    if wardrobe_colors.is_empty() {
        return defaults.iter().take(4).map(|c| c.to_string()).collect();
    }

    let mut result: Vec<String> = Vec::new();
    let candidates = wardrobe_colors
        .iter()
        .take(2)
        .cloned()
        .chain(defaults.iter().take(2).map(|c| c.to_string()));
    for color in candidates {
        if !result.contains(&color) {
            result.push(color);
        }
    }
    result
}

/// 各ショッピングサイトの検索リンク
pub fn shopping_links(category: Category, style: &str) -> Vec<ShoppingLink> {
    let terms = format!("{} {}", category, style).trim().to_lowercase();

    SHOPPING_PLATFORMS
        .iter()
        .filter_map(|(name, platform)| {
            let url = match platform {
                Platform::Query(base, key) => {
                    // 空白は + ではなく %20
                    let mut url = Url::parse(base).ok()?;
                    url.set_query(Some(&format!("{}={}", key, terms)));
                    url
                }
                Platform::Path(base) => {
                    let mut url = Url::parse(base).ok()?;
                    url.path_segments_mut().ok()?.pop_if_empty().push(&terms);
                    url
                }
            };
            Some(ShoppingLink {
                platform: name.to_string(),
                url: url.to_string(),
                price: None,
                currency: "INR".to_string(),
            })
        })
        .collect()
}

/// 登場順に重複を除いた色一覧（空文字は除外）
fn distinct_colors(items: &[WardrobeItem]) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for item in items {
        if !item.color.is_empty() && !colors.contains(&item.color) {
            colors.push(item.color.clone());
        }
    }
    colors
}

fn owned(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| c.to_string()).collect()
}
