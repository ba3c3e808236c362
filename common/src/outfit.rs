//! ルールベースのコーデ生成
//!
//! 1. メインアイテム: 結婚式ならワンピース優先、次にトップス+ボトムス
//!    （色の相性が悪ければ相性の良い組み合わせを探す）、最後にワンピース
//! 2. 靴: スタイルタグで絞り込み、該当なしなら全靴から選ぶ
//! 3. 小物: 1〜2点をランダムに選ぶ
//! 4. 直近に着用した組み合わせと同じなら一度だけ引き直す

use crate::color::colors_compatible;
use crate::error::{Error, Result};
use crate::types::{Category, Occasion, OutfitItem, OutfitSelection, StyleType, WardrobeItem};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::BTreeSet;
use uuid::Uuid;

/// 直近に着用したコーデ（コーデID → メインアイテムの集合）
#[derive(Debug, Clone, Default)]
pub struct RecentlyWorn {
    outfits: Vec<(Uuid, BTreeSet<Uuid>)>,
}

impl RecentlyWorn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, outfit_id: Uuid, main_items: impl IntoIterator<Item = Uuid>) {
        let items: BTreeSet<Uuid> = main_items.into_iter().collect();
        if !items.is_empty() {
            self.outfits.push((outfit_id, items));
        }
    }

    /// メインアイテムの組み合わせが一致する着用済みコーデのID
    pub fn matching(&self, items: &[OutfitItem]) -> Option<Uuid> {
        if items.is_empty() {
            return None;
        }
        let key: BTreeSet<Uuid> = items.iter().map(|i| i.wardrobe_id).collect();
        self.outfits
            .iter()
            .find(|(_, worn)| *worn == key)
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.outfits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outfits.is_empty()
    }
}

/// スタイルタグで絞り込む
///
/// タグを持たないアイテムは常に通す。
pub fn filter_by_style<'a>(items: &[&'a WardrobeItem], style: StyleType) -> Vec<&'a WardrobeItem> {
    let keywords = style.keywords();
    items
        .iter()
        .copied()
        .filter(|item| {
            item.style_tags.is_empty()
                || item.style_tags.iter().any(|tag| {
                    let tag = tag.to_lowercase();
                    keywords.iter().any(|kw| tag.contains(kw))
                })
        })
        .collect()
}

/// ヘアスタイルの提案（シーン優先）
pub fn hairstyle_suggestion(style: StyleType, occasion: Option<Occasion>) -> &'static str {
    let by_occasion = match occasion {
        Some(Occasion::Office) => Some("Professional bun or neat ponytail"),
        Some(Occasion::Party) => Some("Voluminous curls or elegant updo"),
        Some(Occasion::Wedding) => Some("Elegant updo with accessories"),
        Some(Occasion::Travel) => Some("Easy braids or low bun"),
        Some(Occasion::Daily) => Some("Natural waves or simple style"),
        _ => None,
    };

    by_occasion.unwrap_or(match style {
        StyleType::Casual => "Relaxed waves or a simple ponytail",
        StyleType::Attractive => "Loose curls or sleek straight hair",
        StyleType::Traditional => "Classic updo or neat bun",
        StyleType::TrendAligned => "Modern braids or textured waves",
    })
}

/// ワードローブからコーデを1つ選ぶ
pub fn select_outfit<R: Rng + ?Sized>(
    wardrobe: &[WardrobeItem],
    style: StyleType,
    occasion: Option<Occasion>,
    recently_worn: &RecentlyWorn,
    rng: &mut R,
) -> Result<OutfitSelection> {
    if wardrobe.is_empty() {
        return Err(Error::EmptyWardrobe);
    }

    let mut selection = draw(wardrobe, style, occasion, rng);

    if recently_worn.matching(&selection.items).is_some() {
        selection = draw(wardrobe, style, occasion, rng);
        selection.recently_worn = recently_worn.matching(&selection.items);
    }

    Ok(selection)
}

fn draw<R: Rng + ?Sized>(
    wardrobe: &[WardrobeItem],
    style: StyleType,
    occasion: Option<Occasion>,
    rng: &mut R,
) -> OutfitSelection {
    let tops = by_category(wardrobe, Category::Tops);
    let bottoms = by_category(wardrobe, Category::Bottoms);
    let dresses = by_category(wardrobe, Category::Dresses);
    let footwear = by_category(wardrobe, Category::Footwear);
    let accessories = by_category(wardrobe, Category::Accessories);

    let items = select_main_pieces(&tops, &bottoms, &dresses, occasion, rng)
        .into_iter()
        .map(OutfitItem::from)
        .collect();

    let styled_shoes = filter_by_style(&footwear, style);
    let shoe_pool = if styled_shoes.is_empty() { &footwear } else { &styled_shoes };
    let shoes = shoe_pool.choose(rng).map(|s| OutfitItem::from(*s));

    let accessories = if accessories.is_empty() {
        Vec::new()
    } else {
        let count = rng.random_range(1..=2usize).min(accessories.len());
        accessories
            .choose_multiple(rng, count)
            .map(|a| OutfitItem::from(*a))
            .collect()
    };

    OutfitSelection {
        items,
        shoes,
        accessories,
        hairstyle_suggestion: hairstyle_suggestion(style, occasion).to_string(),
        recently_worn: None,
    }
}

fn select_main_pieces<'a, R: Rng + ?Sized>(
    tops: &[&'a WardrobeItem],
    bottoms: &[&'a WardrobeItem],
    dresses: &[&'a WardrobeItem],
    occasion: Option<Occasion>,
    rng: &mut R,
) -> Vec<&'a WardrobeItem> {
    if occasion == Some(Occasion::Wedding) {
        if let Some(dress) = dresses.choose(rng) {
            return vec![*dress];
        }
    }

    if let (Some(&top), Some(&bottom)) = (tops.choose(rng), bottoms.choose(rng)) {
        if colors_compatible(&top.color, &bottom.color) || tops.len() == 1 || bottoms.len() == 1 {
            return vec![top, bottom];
        }

        // ランダムなボトムスに合うトップス → ランダムなトップスに合うボトムス → そのまま
        if let Some(&matching_top) = tops.iter().find(|t| colors_compatible(&t.color, &bottom.color)) {
            return vec![matching_top, bottom];
        }
        if let Some(&matching_bottom) = bottoms.iter().find(|b| colors_compatible(&top.color, &b.color)) {
            return vec![top, matching_bottom];
        }
        return vec![top, bottom];
    }

    dresses.choose(rng).map(|d| vec![*d]).unwrap_or_default()
}

fn by_category(wardrobe: &[WardrobeItem], category: Category) -> Vec<&WardrobeItem> {
    wardrobe.iter().filter(|i| i.category == category).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn ids(items: &[OutfitItem]) -> Vec<Uuid> {
        items.iter().map(|i| i.wardrobe_id).collect()
    }

    #[test]
    fn test_empty_wardrobe_is_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = select_outfit(&[], StyleType::Casual, None, &RecentlyWorn::new(), &mut rng);
        assert!(matches!(result, Err(Error::EmptyWardrobe)));
    }

    #[test]
    fn test_wedding_prefers_dress() {
        let wardrobe = vec![
            WardrobeItem::new(Category::Tops, "white"),
            WardrobeItem::new(Category::Bottoms, "black"),
            WardrobeItem::new(Category::Dresses, "red"),
        ];
        let dress_id = wardrobe[2].id;

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection = select_outfit(
                &wardrobe,
                StyleType::Traditional,
                Some(Occasion::Wedding),
                &RecentlyWorn::new(),
                &mut rng,
            )
            .unwrap();
            assert_eq!(ids(&selection.items), vec![dress_id]);
            assert_eq!(selection.hairstyle_suggestion, "Elegant updo with accessories");
        }
    }

    #[test]
    fn test_top_and_bottom_without_wedding() {
        let wardrobe = vec![
            WardrobeItem::new(Category::Tops, "white"),
            WardrobeItem::new(Category::Bottoms, "blue"),
            WardrobeItem::new(Category::Dresses, "red"),
        ];

        let mut rng = StdRng::seed_from_u64(7);
        let selection =
            select_outfit(&wardrobe, StyleType::Casual, Some(Occasion::Office), &RecentlyWorn::new(), &mut rng)
                .unwrap();

        assert_eq!(ids(&selection.items), vec![wardrobe[0].id, wardrobe[1].id]);
        assert_eq!(selection.items[0].category, Category::Tops);
        assert_eq!(selection.items[1].category, Category::Bottoms);
    }

    #[test]
    fn test_dress_fallback_without_bottoms() {
        let wardrobe = vec![
            WardrobeItem::new(Category::Tops, "white"),
            WardrobeItem::new(Category::Dresses, "green"),
        ];

        let mut rng = StdRng::seed_from_u64(3);
        let selection =
            select_outfit(&wardrobe, StyleType::Casual, None, &RecentlyWorn::new(), &mut rng).unwrap();
        assert_eq!(ids(&selection.items), vec![wardrobe[1].id]);
    }

    #[test]
    fn test_single_top_ignores_color_rules() {
        let wardrobe = vec![
            WardrobeItem::new(Category::Tops, "yellow"),
            WardrobeItem::new(Category::Bottoms, "red"),
            WardrobeItem::new(Category::Bottoms, "pink"),
        ];

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection =
                select_outfit(&wardrobe, StyleType::Casual, None, &RecentlyWorn::new(), &mut rng).unwrap();
            assert_eq!(selection.items.len(), 2);
            assert_eq!(selection.items[0].wardrobe_id, wardrobe[0].id);
        }
    }

    #[test]
    fn test_incompatible_pair_is_repaired() {
        // yellow のトップスは red/pink どちらとも合わない → navy が選ばれる
        let wardrobe = vec![
            WardrobeItem::new(Category::Tops, "yellow"),
            WardrobeItem::new(Category::Tops, "navy"),
            WardrobeItem::new(Category::Bottoms, "red"),
            WardrobeItem::new(Category::Bottoms, "pink"),
        ];
        let color_of = |id: Uuid| wardrobe.iter().find(|i| i.id == id).unwrap().color.clone();

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection =
                select_outfit(&wardrobe, StyleType::Casual, None, &RecentlyWorn::new(), &mut rng).unwrap();
            let top = color_of(selection.items[0].wardrobe_id);
            let bottom = color_of(selection.items[1].wardrobe_id);
            assert!(colors_compatible(&top, &bottom), "seed {}: {} + {}", seed, top, bottom);
            assert_eq!(top, "navy");
        }
    }

    #[test]
    fn test_shoes_filtered_by_style() {
        let wardrobe = vec![
            WardrobeItem::new(Category::Footwear, "black").with_tags(&["Formal", "leather"]),
            WardrobeItem::new(Category::Footwear, "white").with_tags(&["sporty"]),
        ];
        let formal_id = wardrobe[0].id;

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection =
                select_outfit(&wardrobe, StyleType::Traditional, None, &RecentlyWorn::new(), &mut rng).unwrap();
            assert!(selection.items.is_empty());
            assert_eq!(selection.shoes.unwrap().wardrobe_id, formal_id);
        }
    }

    #[test]
    fn test_shoes_fall_back_to_any_footwear() {
        let wardrobe = vec![WardrobeItem::new(Category::Footwear, "white").with_tags(&["sporty"])];
        let mut rng = StdRng::seed_from_u64(5);
        let selection =
            select_outfit(&wardrobe, StyleType::Attractive, None, &RecentlyWorn::new(), &mut rng).unwrap();
        assert_eq!(selection.shoes.unwrap().wardrobe_id, wardrobe[0].id);
    }

    #[test]
    fn test_accessories_one_or_two_distinct() {
        let wardrobe: Vec<WardrobeItem> = (0..5)
            .map(|_| WardrobeItem::new(Category::Accessories, "gold"))
            .collect();

        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection =
                select_outfit(&wardrobe, StyleType::Casual, None, &RecentlyWorn::new(), &mut rng).unwrap();
            let count = selection.accessories.len();
            assert!((1..=2).contains(&count));
            let unique: HashSet<Uuid> = ids(&selection.accessories).into_iter().collect();
            assert_eq!(unique.len(), count);
        }
    }

    #[test]
    fn test_accessories_limited_by_available() {
        let wardrobe = vec![WardrobeItem::new(Category::Accessories, "silver")];
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selection =
                select_outfit(&wardrobe, StyleType::Casual, None, &RecentlyWorn::new(), &mut rng).unwrap();
            assert_eq!(selection.accessories.len(), 1);
        }
    }

    #[test]
    fn test_recently_worn_reported_when_unavoidable() {
        let wardrobe = vec![
            WardrobeItem::new(Category::Tops, "white"),
            WardrobeItem::new(Category::Bottoms, "black"),
        ];
        let worn_id = Uuid::new_v4();
        let mut worn = RecentlyWorn::new();
        worn.insert(worn_id, [wardrobe[1].id, wardrobe[0].id]);

        let mut rng = StdRng::seed_from_u64(11);
        let selection = select_outfit(&wardrobe, StyleType::Casual, None, &worn, &mut rng).unwrap();
        assert_eq!(selection.recently_worn, Some(worn_id));
    }

    #[test]
    fn test_recently_worn_ignores_other_combinations() {
        let wardrobe = vec![
            WardrobeItem::new(Category::Tops, "white"),
            WardrobeItem::new(Category::Bottoms, "black"),
        ];
        let mut worn = RecentlyWorn::new();
        worn.insert(Uuid::new_v4(), [wardrobe[0].id, Uuid::new_v4()]);

        let mut rng = StdRng::seed_from_u64(2);
        let selection = select_outfit(&wardrobe, StyleType::Casual, None, &worn, &mut rng).unwrap();
        assert_eq!(selection.recently_worn, None);
    }

    #[test]
    fn test_recently_worn_skips_empty_sets() {
        let mut worn = RecentlyWorn::new();
        worn.insert(Uuid::new_v4(), Vec::new());
        assert!(worn.is_empty());
        assert_eq!(worn.matching(&[]), None);
    }

    #[test]
    fn test_filter_by_style_keeps_untagged() {
        let tagged = WardrobeItem::new(Category::Footwear, "red").with_tags(&["party"]);
        let untagged = WardrobeItem::new(Category::Footwear, "red");
        let trendy = WardrobeItem::new(Category::Footwear, "red").with_tags(&["Ultra-Trendy"]);
        let items = vec![&tagged, &untagged, &trendy];

        let filtered = filter_by_style(&items, StyleType::TrendAligned);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].id, untagged.id);
        assert_eq!(filtered[1].id, trendy.id);
    }

    #[test]
    fn test_hairstyle_occasion_wins() {
        assert_eq!(
            hairstyle_suggestion(StyleType::Casual, Some(Occasion::Office)),
            "Professional bun or neat ponytail"
        );
        assert_eq!(
            hairstyle_suggestion(StyleType::TrendAligned, None),
            "Modern braids or textured waves"
        );
        // ガイドのみのシーンはスタイル側にフォールバック
        assert_eq!(
            hairstyle_suggestion(StyleType::Attractive, Some(Occasion::Festival)),
            "Loose curls or sleek straight hair"
        );
    }
}
