//! Fingerprints derived from dish names: the cooking method and the main ingredient.
//!
//! Both are a longest-match scan against a fixed, ordered vocabulary. Specific tokens are
//! listed before the generic ones they contain ("煮付け" before "煮物" before "煮") so a
//! shorter substring never masks a more specific technique.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::recipe::Dish;

const COOKING_METHOD_TOKENS: &[&str] = &[
    // grilled
    "照り焼き",
    "生姜焼き",
    "しょうが焼き",
    "西京焼き",
    "蒲焼き",
    "塩焼き",
    "味噌焼き",
    "ホイル焼き",
    "チーズ焼き",
    "ハーブ焼き",
    "卵焼き",
    "玉子焼き",
    "焼き物",
    // fried
    "竜田揚げ",
    "唐揚げ",
    "から揚げ",
    "天ぷら",
    "フライ",
    "カツ",
    "揚げ浸し",
    "揚げ物",
    // simmered
    "煮浸し",
    "煮付け",
    "味噌煮",
    "甘辛煮",
    "角煮",
    "含め煮",
    "煮物",
    "煮",
    // dressed
    "胡麻和え",
    "ごま和え",
    "おかか和え",
    "白和え",
    "ナムル",
    "和え物",
    "和え",
    // stir-fried
    "きんぴら",
    "金平",
    "チャンプルー",
    "ソテー",
    "炒め物",
    "炒め",
    // other
    "蒸し物",
    "蒸し",
    "酢の物",
    "マリネ",
    "ピクルス",
    "サラダ",
    "漬物",
    "浅漬け",
    "漬け",
    "焼き",
];

const MAIN_INGREDIENT_TOKENS: &[&str] = &[
    "鶏むね",
    "鶏もも",
    "ささみ",
    "手羽",
    "鶏",
    "チキン",
    "豚バラ",
    "豚こま",
    "豚ロース",
    "豚",
    "ポーク",
    "牛",
    "ビーフ",
    "ひき肉",
    "ハンバーグ",
    "鮭",
    "サーモン",
    "サバ",
    "鯖",
    "ブリ",
    "鰤",
    "タラ",
    "鱈",
    "サワラ",
    "鰆",
    "アジ",
    "鯵",
    "イワシ",
    "カジキ",
    "エビ",
    "海老",
    "イカ",
    "ちくわ",
    "卵",
    "玉子",
    "厚揚げ",
];

/// Normalized cooking-method label extracted from a dish name.
///
/// The empty label is the "unknown" sentinel: it never matches anything, including
/// another empty label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CookingMethod(String);

impl CookingMethod {
    pub fn unknown() -> Self {
        Self(String::new())
    }

    pub fn from_label(label: &str) -> Self {
        Self(label.trim().to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True only when both labels are known and identical.
    pub fn same_as(&self, other: &CookingMethod) -> bool {
        !self.is_unknown() && self.0 == other.0
    }
}

impl fmt::Display for CookingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Longest token from `vocabulary` contained in `text`. Ties go to the earlier token.
fn longest_match(text: &str, vocabulary: &[&'static str]) -> Option<&'static str> {
    let mut best: Option<&'static str> = None;
    for &token in vocabulary {
        if !text.contains(token) {
            continue;
        }
        match best {
            Some(current) if current.chars().count() >= token.chars().count() => {}
            _ => best = Some(token),
        }
    }
    best
}

pub fn extract_cooking_method(dish_name: &str) -> CookingMethod {
    longest_match(dish_name, COOKING_METHOD_TOKENS)
        .map(CookingMethod::from_label)
        .unwrap_or_default()
}

/// Main ingredient of a dish: first from its name, then from its ingredient list.
/// Returns an empty string when nothing in the vocabulary matches.
pub fn extract_main_ingredient(dish: &Dish) -> String {
    if let Some(token) = longest_match(&dish.name, MAIN_INGREDIENT_TOKENS) {
        return token.to_string();
    }
    dish.ingredients
        .iter()
        .find_map(|ingredient| longest_match(ingredient, MAIN_INGREDIENT_TOKENS))
        .map(str::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_simmer_token_wins_over_generic() {
        assert_eq!(extract_cooking_method("カレイの煮付け").as_str(), "煮付け");
        assert_eq!(extract_cooking_method("かぼちゃの煮物").as_str(), "煮物");
        assert_eq!(extract_cooking_method("サバの味噌煮").as_str(), "味噌煮");
    }

    #[test]
    fn test_longest_match_across_families() {
        assert_eq!(extract_cooking_method("なすの揚げ浸し").as_str(), "揚げ浸し");
        assert_eq!(extract_cooking_method("鶏の照り焼き").as_str(), "照り焼き");
        assert_eq!(extract_cooking_method("ほうれん草の胡麻和え").as_str(), "胡麻和え");
        assert_eq!(extract_cooking_method("ピーマンの炒め物").as_str(), "炒め物");
    }

    #[test]
    fn test_unmatched_name_yields_unknown() {
        let method = extract_cooking_method("ミニトマト");
        assert!(method.is_unknown());
    }

    #[test]
    fn test_unknown_never_matches_unknown() {
        let a = extract_cooking_method("ミニトマト");
        let b = extract_cooking_method("ブロッコリー");
        assert!(!a.same_as(&b));
        assert!(!a.same_as(&a));
    }

    #[test]
    fn test_known_methods_match() {
        let a = extract_cooking_method("ごぼうのきんぴら");
        let b = extract_cooking_method("れんこんのきんぴら");
        assert!(a.same_as(&b));
    }

    #[test]
    fn test_main_ingredient_prefers_name_then_ingredients() {
        let dish = Dish::new("鮭の塩焼き", &["鮭の切り身", "塩"], &["焼く"]);
        assert_eq!(extract_main_ingredient(&dish), "鮭");

        let dish = Dish::new("甘辛そぼろ", &["豚ひき肉", "醤油"], &["炒める"]);
        assert_eq!(extract_main_ingredient(&dish), "ひき肉");

        let dish = Dish::new("彩り野菜", &["にんじん"], &["切る"]);
        assert_eq!(extract_main_ingredient(&dish), "");
    }
}
