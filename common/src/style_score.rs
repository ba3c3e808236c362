//! スタイルスコアと成長分析
//!
//! 着用記録（評価 1〜5 とフィードバック文）からスコアを算出し、
//! 履歴全体の平均・傾向・おすすめを集計する。

use crate::types::{Occasion, Priority};
use serde::{Deserialize, Serialize};

const BASE_SCORE: i32 = 50;
const POSITIVE_KEYWORDS: &[&str] = &["love", "great", "perfect", "amazing", "beautiful", "stylish", "comfortable"];
const NEGATIVE_KEYWORDS: &[&str] = &["hate", "bad", "ugly", "uncomfortable", "wrong"];

/// 傾向判定の比較幅（直近5件 vs その前の5件）
const TREND_WINDOW: usize = 5;
const TREND_THRESHOLD: f64 = 5.0;

/// スタイルスコア（0〜100）
///
/// 基本点50、評価1つにつき±10（3が基準）、ポジティブ語 +5、ネガティブ語 -10。
pub fn style_score(rating: Option<u8>, feedback: Option<&str>) -> u8 {
    let mut score = BASE_SCORE;

    if let Some(rating) = rating {
        score += (i32::from(rating) - 3) * 10;
    }

    if let Some(feedback) = feedback {
        let lower = feedback.to_lowercase();
        let positive = POSITIVE_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count() as i32;
        let negative = NEGATIVE_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count() as i32;
        score += positive * 5;
        score -= negative * 10;
    }

    score.clamp(0, 100) as u8
}

/// 改善のヒント
pub fn improvement_suggestions(rating: Option<u8>, feedback: Option<&str>) -> Vec<String> {
    let mut suggestions = Vec::new();

    if rating.map_or(true, |r| r < 3) {
        suggestions.push("Try experimenting with different color combinations");
        suggestions.push("Consider adding accessories to enhance your look");
    }

    if let Some(feedback) = feedback {
        let lower = feedback.to_lowercase();
        if lower.contains("color") || lower.contains("colour") {
            suggestions.push("Explore color theory to find better combinations");
        }
        if lower.contains("fit") || lower.contains("size") {
            suggestions.push("Ensure your clothes fit well for a polished look");
        }
        if lower.contains("accessory") || lower.contains("jewelry") {
            suggestions.push("Accessories can elevate any outfit - try adding some");
        }
    }

    if suggestions.is_empty() {
        suggestions.push("Keep experimenting with different styles");
        suggestions.push("Take photos to track what works best for you");
    }

    suggestions.into_iter().map(String::from).collect()
}

/// 集計対象の1件（新しい順に渡す）
#[derive(Debug, Clone, Copy)]
pub struct ScoredEntry {
    pub rating: Option<u8>,
    pub style_score: u8,
    pub occasion: Option<Occasion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Rating,
    Score,
    Variety,
    Consistency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub message: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccasionCount {
    pub occasion: Occasion,
    pub count: usize,
}

/// 成長分析の結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProgress {
    pub total_outfits: usize,
    /// 小数点以下1桁に丸めた平均評価
    pub average_rating: f64,
    pub average_style_score: u32,
    pub improvement_trend: Trend,
    pub top_occasions: Vec<OccasionCount>,
    pub recommendations: Vec<Recommendation>,
}

/// 履歴を集計する（`entries` は着用日の新しい順）
pub fn progress(entries: &[ScoredEntry]) -> StyleProgress {
    if entries.is_empty() {
        return StyleProgress::default();
    }

    let ratings: Vec<f64> = entries.iter().filter_map(|e| e.rating).map(f64::from).collect();
    let scores: Vec<f64> = entries.iter().map(|e| f64::from(e.style_score)).collect();

    let average_rating = mean(&ratings).unwrap_or(0.0);
    let average_style_score = mean(&scores).unwrap_or(0.0);

    StyleProgress {
        total_outfits: entries.len(),
        average_rating: (average_rating * 10.0).round() / 10.0,
        average_style_score: average_style_score.round() as u32,
        improvement_trend: trend(&scores),
        top_occasions: top_occasions(entries, 5),
        recommendations: recommendations(entries, average_rating, average_style_score),
    }
}

fn trend(scores: &[f64]) -> Trend {
    let recent = &scores[..scores.len().min(TREND_WINDOW)];
    let older = &scores[scores.len().min(TREND_WINDOW)..scores.len().min(TREND_WINDOW * 2)];

    match (mean(recent), mean(older)) {
        (Some(recent), Some(older)) if recent > older + TREND_THRESHOLD => Trend::Improving,
        (Some(recent), Some(older)) if recent < older - TREND_THRESHOLD => Trend::Declining,
        _ => Trend::Neutral,
    }
}

fn top_occasions(entries: &[ScoredEntry], limit: usize) -> Vec<OccasionCount> {
    let mut counts: Vec<OccasionCount> = Vec::new();
    for occasion in entries.iter().filter_map(|e| e.occasion) {
        match counts.iter_mut().find(|c| c.occasion == occasion) {
            Some(c) => c.count += 1,
            None => counts.push(OccasionCount { occasion, count: 1 }),
        }
    }
    // 安定ソートなので同数は初出順
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

fn recommendations(entries: &[ScoredEntry], average_rating: f64, average_style_score: f64) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if average_rating < 3.5 {
        recs.push(Recommendation {
            kind: RecommendationKind::Rating,
            message: "Your outfit ratings are below average. Try experimenting with different styles.".to_string(),
            priority: Priority::High,
        });
    }

    if average_style_score < 60.0 {
        recs.push(Recommendation {
            kind: RecommendationKind::Score,
            message: "Your style score can improve. Focus on color coordination and fit.".to_string(),
            priority: Priority::High,
        });
    }

    let mut unique: Vec<Occasion> = entries.iter().filter_map(|e| e.occasion).collect();
    unique.sort();
    unique.dedup();
    if unique.len() < 3 && entries.len() > 5 {
        recs.push(Recommendation {
            kind: RecommendationKind::Variety,
            message: "Try exploring different occasions and styles for more variety.".to_string(),
            priority: Priority::Medium,
        });
    }

    let recent_ratings: Vec<f64> = entries
        .iter()
        .take(TREND_WINDOW)
        .filter_map(|e| e.rating)
        .map(f64::from)
        .collect();
    if variance(&recent_ratings).is_some_and(|v| v > 1.5) {
        recs.push(Recommendation {
            kind: RecommendationKind::Consistency,
            message: "Your outfit quality varies. Focus on consistent styling principles.".to_string(),
            priority: Priority::Medium,
        });
    }

    recs
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// 母分散
pub fn variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rating: u8, occasion: Option<Occasion>) -> ScoredEntry {
        ScoredEntry {
            rating: Some(rating),
            style_score: style_score(Some(rating), None),
            occasion,
        }
    }

    #[test]
    fn test_style_score_from_rating() {
        assert_eq!(style_score(Some(3), None), 50);
        assert_eq!(style_score(Some(5), None), 70);
        assert_eq!(style_score(Some(1), None), 30);
        assert_eq!(style_score(None, None), 50);
    }

    #[test]
    fn test_style_score_keywords() {
        // love + perfect = +10
        assert_eq!(style_score(Some(4), Some("Love it, PERFECT fit")), 70);
        // uncomfortable は "comfortable" も含むので +5 -10
        assert_eq!(style_score(Some(3), Some("uncomfortable")), 45);
    }

    #[test]
    fn test_style_score_clamped() {
        assert_eq!(style_score(Some(1), Some("hate bad ugly wrong")), 0);
        assert_eq!(
            style_score(Some(5), Some("love great perfect amazing beautiful stylish comfortable")),
            100
        );
    }

    #[test]
    fn test_improvement_suggestions() {
        let low = improvement_suggestions(Some(2), Some("the colour was off"));
        assert_eq!(low.len(), 3);
        assert_eq!(low[2], "Explore color theory to find better combinations");

        let good = improvement_suggestions(Some(5), Some("nice"));
        assert_eq!(
            good,
            vec![
                "Keep experimenting with different styles",
                "Take photos to track what works best for you"
            ]
        );

        let unrated = improvement_suggestions(None, None);
        assert_eq!(unrated[0], "Try experimenting with different color combinations");
    }

    #[test]
    fn test_progress_empty() {
        let progress = progress(&[]);
        assert_eq!(progress.total_outfits, 0);
        assert_eq!(progress.improvement_trend, Trend::Neutral);
        assert!(progress.recommendations.is_empty());
    }

    #[test]
    fn test_progress_averages() {
        let entries = vec![entry(5, Some(Occasion::Office)), entry(4, Some(Occasion::Office)), entry(4, None)];
        let progress = progress(&entries);
        assert_eq!(progress.total_outfits, 3);
        assert_eq!(progress.average_rating, 4.3);
        assert_eq!(progress.average_style_score, 63);
        assert_eq!(progress.top_occasions, vec![OccasionCount { occasion: Occasion::Office, count: 2 }]);
        assert!(progress.recommendations.is_empty());
    }

    #[test]
    fn test_progress_trend() {
        // 直近5件が評価5、その前の5件が評価3 → improving
        let mut entries: Vec<ScoredEntry> = (0..5).map(|_| entry(5, None)).collect();
        entries.extend((0..5).map(|_| entry(3, None)));
        assert_eq!(progress(&entries).improvement_trend, Trend::Improving);

        entries.reverse();
        assert_eq!(progress(&entries).improvement_trend, Trend::Declining);

        // 5件以下では比較対象がない
        let few: Vec<ScoredEntry> = (0..5).map(|_| entry(1, None)).collect();
        assert_eq!(progress(&few).improvement_trend, Trend::Neutral);
    }

    #[test]
    fn test_progress_recommendations() {
        let entries: Vec<ScoredEntry> = vec![5, 1, 5, 1, 3, 3]
            .into_iter()
            .map(|r| entry(r, Some(Occasion::Daily)))
            .collect();
        let kinds: Vec<RecommendationKind> = progress(&entries).recommendations.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::Rating,
                RecommendationKind::Score,
                RecommendationKind::Variety,
                RecommendationKind::Consistency
            ]
        );
    }

    #[test]
    fn test_variance() {
        assert_eq!(variance(&[]), None);
        assert_eq!(variance(&[2.0, 4.0]), Some(1.0));
    }
}
