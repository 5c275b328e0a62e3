//! Notable tokens: seasonings, herbs, citrus and aromatics that, when they appear in a
//! dish name, must also appear in its ingredient list.

pub struct NotableToken {
    pub label: &'static str,
    /// Spellings that mark the token in a dish name.
    pub name_aliases: &'static [&'static str],
    /// Any ingredient containing one of these satisfies the token.
    pub ingredient_matches: &'static [&'static str],
}

const fn token(
    label: &'static str,
    name_aliases: &'static [&'static str],
    ingredient_matches: &'static [&'static str],
) -> NotableToken {
    NotableToken {
        label,
        name_aliases,
        ingredient_matches,
    }
}

const HERBS: &[&str] = &[
    "ハーブ",
    "バジル",
    "ローズマリー",
    "タイム",
    "パセリ",
    "オレガノ",
    "ディル",
    "セージ",
    "ミント",
    "イタリアンパセリ",
];

pub const NOTABLE_TOKENS: &[NotableToken] = &[
    token("ハーブ", &["ハーブ"], HERBS),
    token("バジル", &["バジル"], &["バジル"]),
    token("ローズマリー", &["ローズマリー"], &["ローズマリー"]),
    token("生姜", &["生姜", "しょうが", "ショウガ", "ジンジャー"], &["生姜", "しょうが", "ショウガ", "ジンジャー"]),
    token("にんにく", &["にんにく", "ニンニク", "ガーリック"], &["にんにく", "ニンニク", "ガーリック"]),
    token("大葉", &["大葉", "しそ", "紫蘇"], &["大葉", "しそ", "紫蘇"]),
    token("柚子胡椒", &["柚子胡椒", "ゆず胡椒", "ゆずこしょう"], &["柚子胡椒", "ゆず胡椒", "ゆずこしょう"]),
    token("柚子", &["柚子", "ゆず", "ユズ"], &["柚子", "ゆず", "ユズ"]),
    token("レモン", &["レモン"], &["レモン"]),
    token("すだち", &["すだち", "スダチ"], &["すだち", "スダチ"]),
    token("梅", &["梅"], &["梅"]),
    token("味噌", &["味噌", "みそ"], &["味噌", "みそ", "ミソ"]),
    token("胡麻", &["胡麻", "ごま", "ゴマ"], &["胡麻", "ごま", "ゴマ"]),
    token("塩麹", &["塩麹", "塩こうじ"], &["塩麹", "塩こうじ"]),
    token("カレー", &["カレー"], &["カレー"]),
    token("ケチャップ", &["ケチャップ"], &["ケチャップ"]),
    token("チーズ", &["チーズ"], &["チーズ"]),
    token("バター", &["バター"], &["バター"]),
    token("ポン酢", &["ポン酢", "ぽん酢"], &["ポン酢", "ぽん酢"]),
    token("わさび", &["わさび", "ワサビ", "山葵"], &["わさび", "ワサビ", "山葵"]),
    token("からし", &["からし", "辛子", "マスタード"], &["からし", "辛子", "マスタード"]),
    token("山椒", &["山椒"], &["山椒"]),
    token("七味", &["七味"], &["七味"]),
    token("青のり", &["青のり", "青海苔"], &["青のり", "青海苔"]),
];

/// Tokens named by `dish_name`, paired with the alias that matched.
///
/// When one match is contained in another (柚子 inside 柚子胡椒), only the longer one is
/// kept, so a single missing ingredient is reported once.
pub fn tokens_in_name(dish_name: &str) -> Vec<&'static NotableToken> {
    let hits: Vec<(&'static NotableToken, &'static str)> = NOTABLE_TOKENS
        .iter()
        .filter_map(|t| {
            t.name_aliases
                .iter()
                .copied()
                .filter(|alias| dish_name.contains(alias))
                .max_by_key(|alias| alias.chars().count())
                .map(|alias| (t, alias))
        })
        .collect();

    hits.iter()
        .filter(|(token, alias)| {
            !hits.iter().any(|(other, other_alias)| {
                !std::ptr::eq(*other, *token)
                    && other_alias.len() > alias.len()
                    && other_alias.contains(alias)
            })
        })
        .map(|(token, _)| *token)
        .collect()
}

/// True when some ingredient contains one of the token's matches, or is itself contained
/// in one (e.g. ingredient "ゆず" for a dish seasoned with "ゆずこしょう").
pub fn ingredients_cover(token: &NotableToken, ingredients: &[String]) -> bool {
    ingredients.iter().any(|ingredient| {
        let ingredient = ingredient.trim();
        token.ingredient_matches.iter().any(|m| {
            ingredient.contains(m) || (ingredient.chars().count() >= 2 && m.contains(ingredient))
        })
    })
}
