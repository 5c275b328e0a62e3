use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for name-derived recipe ids (presets and fallbacks).
const RECIPE_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6b1f_0e4c_9a52_4d0b_8f7e_2c41_b3a9_d570);

/// Bento category. Closed set; never changes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Balanced, all-round bento.
    #[serde(rename = "omakase", alias = "balanced")]
    Omakase,
    #[serde(rename = "hearty")]
    Hearty,
    #[serde(rename = "fishMain", alias = "fish-focused")]
    FishMain,
    /// Quick, few-step bento.
    #[serde(rename = "simple", alias = "quick")]
    Simple,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Omakase,
        Category::Hearty,
        Category::FishMain,
        Category::Simple,
    ];

    /// Wire key, matching the preset catalog JSON keys.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Omakase => "omakase",
            Category::Hearty => "hearty",
            Category::FishMain => "fishMain",
            Category::Simple => "simple",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Omakase => "おまかせ",
            Category::Hearty => "がっつり",
            Category::FishMain => "お魚弁当",
            Category::Simple => "簡単弁当",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Omakase => "バランス重視の万能お弁当",
            Category::Hearty => "ボリューム満点・満足感たっぷり",
            Category::FishMain => "魚をメインにした和風弁当",
            Category::Simple => "時短・簡単に作れるお弁当",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "omakase" | "balanced" => Ok(Category::Omakase),
            "hearty" => Ok(Category::Hearty),
            "fishMain" | "fish-focused" | "fish_main" => Ok(Category::FishMain),
            "simple" | "quick" => Ok(Category::Simple),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    #[serde(rename = "簡単", alias = "easy")]
    Easy,
    #[serde(rename = "普通", alias = "medium")]
    Medium,
    #[serde(rename = "上級", alias = "hard")]
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    #[serde(rename = "春", alias = "spring")]
    Spring,
    #[serde(rename = "夏", alias = "summer")]
    Summer,
    #[serde(rename = "秋", alias = "autumn")]
    Autumn,
    #[serde(rename = "冬", alias = "winter")]
    Winter,
}

impl Season {
    pub fn from_date(date: NaiveDate) -> Self {
        match date.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    /// A catalog entry with no season tag fits every season.
    pub fn admits(&self, tag: Option<Season>) -> bool {
        tag.map_or(true, |t| t == *self)
    }
}

/// One of the three dishes in a bento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dish {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl Dish {
    pub fn new(name: &str, ingredients: &[&str], instructions: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            instructions: instructions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Which slot of a recipe a dish occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DishSlot {
    MainDish,
    SideDish1,
    SideDish2,
}

/// A bento recipe: always exactly one main dish and two side dishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub main_dish: Dish,
    pub side_dish1: Dish,
    pub side_dish2: Dish,
    pub prep_time: u32,
    pub calories: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Recipe {
    pub fn dish(&self, slot: DishSlot) -> &Dish {
        match slot {
            DishSlot::MainDish => &self.main_dish,
            DishSlot::SideDish1 => &self.side_dish1,
            DishSlot::SideDish2 => &self.side_dish2,
        }
    }

    pub fn side_dishes(&self) -> [&Dish; 2] {
        [&self.side_dish1, &self.side_dish2]
    }

    /// Stable id derived from category and the three dish names.
    pub fn stable_id(category: Category, main: &str, side1: &str, side2: &str) -> Uuid {
        let key = format!("{}/{main}/{side1}/{side2}", category.key());
        Uuid::new_v5(&RECIPE_ID_NAMESPACE, key.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parses_wire_names_and_aliases() {
        assert_eq!("fishMain".parse::<Category>().unwrap(), Category::FishMain);
        assert_eq!("fish-focused".parse::<Category>().unwrap(), Category::FishMain);
        assert_eq!("balanced".parse::<Category>().unwrap(), Category::Omakase);
        assert_eq!("quick".parse::<Category>().unwrap(), Category::Simple);
        assert!("dessert".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_uses_catalog_keys() {
        let json = serde_json::to_string(&Category::FishMain).unwrap();
        assert_eq!(json, "\"fishMain\"");
        let parsed: Category = serde_json::from_str("\"balanced\"").unwrap();
        assert_eq!(parsed, Category::Omakase);
    }

    #[test]
    fn test_difficulty_is_ordered_and_accepts_japanese() {
        assert!(Difficulty::Easy < Difficulty::Medium);
        assert!(Difficulty::Medium < Difficulty::Hard);
        let d: Difficulty = serde_json::from_str("\"上級\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
        let d: Difficulty = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(d, Difficulty::Medium);
    }

    #[test]
    fn test_season_from_month() {
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 15).unwrap();
        assert_eq!(Season::from_date(d(4)), Season::Spring);
        assert_eq!(Season::from_date(d(7)), Season::Summer);
        assert_eq!(Season::from_date(d(10)), Season::Autumn);
        assert_eq!(Season::from_date(d(1)), Season::Winter);
        assert_eq!(Season::from_date(d(12)), Season::Winter);
    }

    #[test]
    fn test_untagged_entries_fit_every_season() {
        assert!(Season::Summer.admits(None));
        assert!(Season::Summer.admits(Some(Season::Summer)));
        assert!(!Season::Summer.admits(Some(Season::Winter)));
    }

    #[test]
    fn test_stable_id_is_deterministic() {
        let a = Recipe::stable_id(Category::Hearty, "唐揚げ", "きんぴらごぼう", "卵焼き");
        let b = Recipe::stable_id(Category::Hearty, "唐揚げ", "きんぴらごぼう", "卵焼き");
        let c = Recipe::stable_id(Category::Simple, "唐揚げ", "きんぴらごぼう", "卵焼き");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
