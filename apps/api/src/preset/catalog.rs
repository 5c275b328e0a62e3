//! Preset main/side dish catalog. Immutable once loaded.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::recipe::{Category, Difficulty, Dish, Season};

const BUILTIN_MAIN_DISHES: &str = include_str!("../../data/preset_main_dishes.json");
const BUILTIN_SIDE_DISHES: &str = include_str!("../../data/preset_side_dishes.json");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetMainDish {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dish: Dish,
    pub prep_time: u32,
    pub calories: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub season: Option<Season>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetSideDish {
    pub name: String,
    pub dish: Dish,
    pub prep_time: u32,
    pub calories: u32,
    /// Label used for equivalence grouping, e.g. "きんぴら" or "煮物".
    #[serde(default)]
    pub cooking_method: String,
    #[serde(default)]
    pub season: Option<Season>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SideDishFile {
    side_dishes: Vec<PresetSideDish>,
}

#[derive(Debug, Clone, Default)]
pub struct PresetCatalog {
    main_dishes: HashMap<Category, Vec<PresetMainDish>>,
    side_dishes: Vec<PresetSideDish>,
}

impl PresetCatalog {
    pub fn new(main_dishes: HashMap<Category, Vec<PresetMainDish>>, side_dishes: Vec<PresetSideDish>) -> Self {
        Self {
            main_dishes,
            side_dishes,
        }
    }

    /// Parses the two catalog documents: `{"<category>": [main…]}` and `{"sideDishes": […]}`.
    /// Unknown category keys are rejected.
    pub fn from_json(main_json: &str, side_json: &str) -> Result<Self> {
        let raw_mains: HashMap<String, Vec<PresetMainDish>> =
            serde_json::from_str(main_json).context("Invalid preset main dish catalog")?;
        let sides: SideDishFile =
            serde_json::from_str(side_json).context("Invalid preset side dish catalog")?;

        let mut main_dishes = HashMap::new();
        for (key, dishes) in raw_mains {
            let category = key
                .parse::<Category>()
                .with_context(|| format!("Unknown category '{key}' in main dish catalog"))?;
            main_dishes.insert(category, dishes);
        }

        Ok(Self::new(main_dishes, sides.side_dishes))
    }

    pub fn from_files(main_path: &Path, side_path: &Path) -> Result<Self> {
        let main_json = std::fs::read_to_string(main_path)
            .with_context(|| format!("Failed to read {}", main_path.display()))?;
        let side_json = std::fs::read_to_string(side_path)
            .with_context(|| format!("Failed to read {}", side_path.display()))?;
        Self::from_json(&main_json, &side_json)
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_MAIN_DISHES, BUILTIN_SIDE_DISHES)
    }

    pub fn main_dishes(&self, category: Category) -> &[PresetMainDish] {
        self.main_dishes
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn side_dishes(&self) -> &[PresetSideDish] {
        &self.side_dishes
    }

    pub fn main_dish_count(&self) -> usize {
        self.main_dishes.values().map(Vec::len).sum()
    }
}
