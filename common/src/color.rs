//! 色の相性判定
//!
//! ベーシックカラーは何とでも合う。それ以外は同色・補色・類似色の
//! 固定テーブルで判定する。テーブルは左側の色をキーにした片方向の関係。

/// 何とでも合わせられる色
pub const NEUTRAL_COLORS: &[&str] = &["black", "white", "gray", "grey", "beige", "navy", "brown"];

/// 補色の組み合わせ
const COMPLEMENTARY: &[(&str, &[&str])] = &[
    ("red", &["green", "blue"]),
    ("blue", &["orange", "red"]),
    ("yellow", &["purple", "blue"]),
    ("green", &["red", "pink"]),
    ("purple", &["yellow", "green"]),
    ("pink", &["green", "blue"]),
    ("orange", &["blue", "purple"]),
];

/// 類似色の組み合わせ
const ANALOGOUS: &[(&str, &[&str])] = &[
    ("red", &["orange", "pink"]),
    ("blue", &["purple", "green"]),
    ("yellow", &["orange", "green"]),
    ("green", &["blue", "yellow"]),
    ("purple", &["blue", "pink"]),
];

/// ベーシックカラーかどうか（大文字小文字は無視）
pub fn is_neutral(color: &str) -> bool {
    let lower = color.trim().to_lowercase();
    NEUTRAL_COLORS.contains(&lower.as_str())
}

/// 2色の相性を判定
///
/// どちらかが未指定なら相性ありとみなす。
pub fn colors_compatible(first: &str, second: &str) -> bool {
    let first = first.trim().to_lowercase();
    let second = second.trim().to_lowercase();

    if first.is_empty() || second.is_empty() {
        return true;
    }

    if is_neutral(&first) || is_neutral(&second) {
        return true;
    }

    if first == second {
        return true;
    }

    table_contains(COMPLEMENTARY, &first, &second) || table_contains(ANALOGOUS, &first, &second)
}

fn table_contains(table: &[(&str, &[&str])], key: &str, value: &str) -> bool {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, values)| values.contains(&value))
        .unwrap_or(false)
}
