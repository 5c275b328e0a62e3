//! Response Validator: turns raw generator output into recipes and flags content issues.
//!
//! Shape problems (bad JSON, wrong recipe count, empty dishes) are `MalformedPayload`
//! errors. Content problems are `ValidationWarning`s: advisory by default, the batch is
//! still returned.

pub mod notable_tokens;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::GenerationError;
use crate::history::cooking_method::extract_cooking_method;
use crate::llm_client::strip_json_fences;
use crate::models::recipe::{Category, Difficulty, Dish, DishSlot, Recipe};
use crate::validation::notable_tokens::{ingredients_cover, tokens_in_name};

pub const BATCH_SIZE: usize = 3;

/// What to do with a batch that parsed cleanly but carries warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Log the warnings and serve the batch.
    #[default]
    WarnAndServe,
    /// Ask the generator once more; serve the fallback batch if the retry still warns.
    RejectAndRetry,
}

impl FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" | "warn_and_serve" => Ok(ValidationPolicy::WarnAndServe),
            "retry" | "reject_and_retry" => Ok(ValidationPolicy::RejectAndRetry),
            other => Err(format!("unknown validation policy '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Raw payload
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDish {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// One unvalidated recipe as produced by the generator.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecipe {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub main_dish: Option<RawDish>,
    pub side_dish1: Option<RawDish>,
    pub side_dish2: Option<RawDish>,
    #[serde(default)]
    pub prep_time: u32,
    #[serde(default)]
    pub calories: u32,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Wrapped { recipes: Vec<RawRecipe> },
    Bare(Vec<RawRecipe>),
}

/// Parses generator text (optionally fenced) into raw recipes.
pub fn parse_batch(text: &str) -> Result<Vec<RawRecipe>, GenerationError> {
    let body = strip_json_fences(text);
    if body.is_empty() {
        return Err(GenerationError::MalformedPayload("empty response".to_string()));
    }
    let payload: RawPayload = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedPayload(format!("invalid JSON: {e}")))?;
    Ok(match payload {
        RawPayload::Wrapped { recipes } => recipes,
        RawPayload::Bare(recipes) => recipes,
    })
}

fn parse_difficulty(label: Option<&str>) -> Difficulty {
    match label.map(str::trim) {
        Some("普通") | Some("medium") => Difficulty::Medium,
        Some("上級") | Some("hard") => Difficulty::Hard,
        _ => Difficulty::Easy,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Warnings
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    /// A notable token in the dish name has no matching ingredient.
    IngredientMismatch {
        recipe_index: usize,
        dish: DishSlot,
        dish_name: String,
        token: String,
    },
    /// Both side dishes of one recipe use the same cooking method.
    DuplicateMethodInRecipe { recipe_index: usize, method: String },
    /// A side dish name appears more than once across the batch.
    DuplicateSideDish { name: String, occurrences: usize },
    /// A side-dish cooking method appears more than once across the batch.
    DuplicateMethodAcrossBatch { method: String, occurrences: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::IngredientMismatch {
                recipe_index,
                dish_name,
                token,
                ..
            } => write!(
                f,
                "recipe {recipe_index}: '{dish_name}' mentions '{token}' but no ingredient matches"
            ),
            ValidationWarning::DuplicateMethodInRecipe {
                recipe_index,
                method,
            } => write!(f, "recipe {recipe_index}: both side dishes are '{method}'"),
            ValidationWarning::DuplicateSideDish { name, occurrences } => {
                write!(f, "side dish '{name}' appears {occurrences} times in batch")
            }
            ValidationWarning::DuplicateMethodAcrossBatch {
                method,
                occurrences,
            } => write!(f, "side-dish method '{method}' appears {occurrences} times in batch"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedBatch {
    pub recipes: Vec<Recipe>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidatedBatch {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ResponseValidator {
    batch_size: usize,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
        }
    }
}

impl ResponseValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates raw generator text in one step.
    pub fn validate_text(&self, category: Category, text: &str) -> Result<ValidatedBatch, GenerationError> {
        self.validate(category, parse_batch(text)?)
    }

    pub fn validate(&self, category: Category, raw: Vec<RawRecipe>) -> Result<ValidatedBatch, GenerationError> {
        if raw.len() != self.batch_size {
            return Err(GenerationError::MalformedPayload(format!(
                "expected {} recipes, got {}",
                self.batch_size,
                raw.len()
            )));
        }

        let recipes = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| into_recipe(category, i, r))
            .collect::<Result<Vec<_>, _>>()?;

        let mut warnings = Vec::new();
        for (i, recipe) in recipes.iter().enumerate() {
            check_ingredient_consistency(i, recipe, &mut warnings);
            check_recipe_diversity(i, recipe, &mut warnings);
        }
        check_batch_diversity(&recipes, &mut warnings);

        for warning in &warnings {
            warn!("Validation warning for {category}: {warning}");
        }

        Ok(ValidatedBatch { recipes, warnings })
    }
}

fn into_dish(recipe_index: usize, slot: DishSlot, raw: Option<RawDish>) -> Result<Dish, GenerationError> {
    let raw = raw.ok_or_else(|| {
        GenerationError::MalformedPayload(format!("recipe {recipe_index}: missing {slot:?}"))
    })?;
    let clean = |items: Vec<String>| -> Vec<String> {
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    };
    let dish = Dish {
        name: raw.name.trim().to_string(),
        ingredients: clean(raw.ingredients),
        instructions: clean(raw.instructions),
    };
    if dish.name.is_empty() || dish.ingredients.is_empty() || dish.instructions.is_empty() {
        return Err(GenerationError::MalformedPayload(format!(
            "recipe {recipe_index}: {slot:?} needs a name, ingredients and instructions"
        )));
    }
    Ok(dish)
}

fn into_recipe(category: Category, index: usize, raw: RawRecipe) -> Result<Recipe, GenerationError> {
    let main_dish = into_dish(index, DishSlot::MainDish, raw.main_dish)?;
    let side_dish1 = into_dish(index, DishSlot::SideDish1, raw.side_dish1)?;
    let side_dish2 = into_dish(index, DishSlot::SideDish2, raw.side_dish2)?;
    let name = match raw.name.trim() {
        "" => main_dish.name.clone(),
        name => name.to_string(),
    };
    Ok(Recipe {
        id: Uuid::new_v4(),
        name,
        description: raw.description.trim().to_string(),
        category,
        main_dish,
        side_dish1,
        side_dish2,
        prep_time: raw.prep_time,
        calories: raw.calories,
        difficulty: parse_difficulty(raw.difficulty.as_deref()),
        tips: raw.tips,
        is_favorite: false,
    })
}

fn check_ingredient_consistency(index: usize, recipe: &Recipe, warnings: &mut Vec<ValidationWarning>) {
    for slot in [DishSlot::MainDish, DishSlot::SideDish1, DishSlot::SideDish2] {
        let dish = recipe.dish(slot);
        for token in tokens_in_name(&dish.name) {
            if !ingredients_cover(token, &dish.ingredients) {
                warnings.push(ValidationWarning::IngredientMismatch {
                    recipe_index: index,
                    dish: slot,
                    dish_name: dish.name.clone(),
                    token: token.label.to_string(),
                });
            }
        }
    }
}

fn check_recipe_diversity(index: usize, recipe: &Recipe, warnings: &mut Vec<ValidationWarning>) {
    let side1 = extract_cooking_method(&recipe.side_dish1.name);
    let side2 = extract_cooking_method(&recipe.side_dish2.name);
    if side1.same_as(&side2) {
        warnings.push(ValidationWarning::DuplicateMethodInRecipe {
            recipe_index: index,
            method: side1.to_string(),
        });
    }
}

/// Counts values, keeping first-seen order so warnings are stable.
fn repeated<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut order = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    order
        .into_iter()
        .filter_map(|v| counts.get(v).filter(|&&c| c > 1).map(|&c| (v, c)))
        .collect()
}

fn check_batch_diversity(recipes: &[Recipe], warnings: &mut Vec<ValidationWarning>) {
    let sides: Vec<&Dish> = recipes.iter().flat_map(|r| r.side_dishes()).collect();

    for (name, occurrences) in repeated(sides.iter().map(|d| d.name.as_str())) {
        warnings.push(ValidationWarning::DuplicateSideDish {
            name: name.to_string(),
            occurrences,
        });
    }

    let methods: Vec<_> = sides
        .iter()
        .map(|d| extract_cooking_method(&d.name))
        .filter(|m| !m.is_unknown())
        .collect();
    for (method, occurrences) in repeated(methods.iter().map(|m| m.as_str())) {
        warnings.push(ValidationWarning::DuplicateMethodAcrossBatch {
            method: method.to_string(),
            occurrences,
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    fn dish(name: &str, ingredients: &[&str]) -> serde_json::Value {
        json!({"name": name, "ingredients": ingredients, "instructions": ["作る"]})
    }

    fn recipe(main: serde_json::Value, side1: serde_json::Value, side2: serde_json::Value) -> serde_json::Value {
        json!({
            "name": "テスト弁当",
            "description": "テスト",
            "mainDish": main,
            "sideDish1": side1,
            "sideDish2": side2,
            "prepTime": 30,
            "calories": 550,
            "difficulty": "普通",
            "tips": ["冷ましてから詰める"]
        })
    }

    /// A clean three-recipe payload with six distinct side dishes and methods.
    pub(crate) fn clean_payload() -> serde_json::Value {
        json!({"recipes": [
            recipe(dish("鶏の照り焼き", &["鶏もも肉", "醤油"]), dish("ごぼうのきんぴら", &["ごぼう"]), dish("卵焼き", &["卵"])),
            recipe(dish("鮭の塩焼き", &["鮭", "塩"]), dish("ひじきの煮物", &["ひじき"]), dish("いんげんのおかか和え", &["いんげん", "かつお節"])),
            recipe(dish("豚の角煮", &["豚バラ", "醤油"]), dish("にんじんのマリネ", &["にんじん", "酢"]), dish("もやしの炒め物", &["もやし"])),
        ]})
    }

    fn validate(payload: serde_json::Value) -> Result<ValidatedBatch, GenerationError> {
        ResponseValidator::new().validate_text(Category::Omakase, &payload.to_string())
    }

    #[test]
    fn test_clean_batch_has_no_warnings() {
        let batch = validate(clean_payload()).unwrap();
        assert_eq!(batch.recipes.len(), 3);
        assert!(batch.is_clean(), "unexpected warnings: {:?}", batch.warnings);
        assert_eq!(batch.recipes[0].difficulty, Difficulty::Medium);
        assert_eq!(batch.recipes[0].category, Category::Omakase);
    }

    #[test]
    fn test_herb_dish_without_herb_warns_once_and_still_serves() {
        let mut payload = clean_payload();
        payload["recipes"][0]["mainDish"] = dish("ハーブ焼き", &["鶏もも肉", "塩", "オリーブオイル"]);

        let batch = validate(payload).unwrap();
        assert_eq!(batch.recipes.len(), 3);
        assert_eq!(
            batch.warnings,
            vec![ValidationWarning::IngredientMismatch {
                recipe_index: 0,
                dish: DishSlot::MainDish,
                dish_name: "ハーブ焼き".to_string(),
                token: "ハーブ".to_string(),
            }]
        );
    }

    #[test]
    fn test_herb_dish_with_rosemary_is_clean() {
        let mut payload = clean_payload();
        payload["recipes"][0]["mainDish"] = dish("ハーブ焼き", &["鶏もも肉", "ローズマリー"]);
        assert!(validate(payload).unwrap().is_clean());
    }

    #[test]
    fn test_same_method_within_recipe_warns() {
        let mut payload = clean_payload();
        payload["recipes"][1]["sideDish2"] = dish("かぼちゃの煮物", &["かぼちゃ"]);

        let batch = validate(payload).unwrap();
        assert!(batch.warnings.contains(&ValidationWarning::DuplicateMethodInRecipe {
            recipe_index: 1,
            method: "煮物".to_string(),
        }));
        assert!(batch.warnings.contains(&ValidationWarning::DuplicateMethodAcrossBatch {
            method: "煮物".to_string(),
            occurrences: 2,
        }));
    }

    #[test]
    fn test_unknown_methods_are_not_duplicates() {
        let mut payload = clean_payload();
        payload["recipes"][0]["sideDish1"] = dish("ミニトマト", &["ミニトマト"]);
        payload["recipes"][0]["sideDish2"] = dish("ブロッコリー", &["ブロッコリー"]);
        assert!(validate(payload).unwrap().is_clean());
    }

    #[test]
    fn test_repeated_side_dish_across_batch_warns() {
        let mut payload = clean_payload();
        payload["recipes"][2]["sideDish1"] = dish("卵焼き", &["卵"]);

        let batch = validate(payload).unwrap();
        assert!(batch.warnings.contains(&ValidationWarning::DuplicateSideDish {
            name: "卵焼き".to_string(),
            occurrences: 2,
        }));
        assert!(batch.warnings.contains(&ValidationWarning::DuplicateMethodAcrossBatch {
            method: "卵焼き".to_string(),
            occurrences: 2,
        }));
    }

    #[test]
    fn test_fenced_and_bare_array_payloads_parse() {
        let fenced = format!("```json\n{}\n```", clean_payload());
        assert_eq!(parse_batch(&fenced).unwrap().len(), 3);

        let bare = clean_payload()["recipes"].to_string();
        assert_eq!(parse_batch(&bare).unwrap().len(), 3);
    }

    #[test]
    fn test_wrong_recipe_count_is_malformed() {
        let mut payload = clean_payload();
        payload["recipes"].as_array_mut().unwrap().pop();
        assert!(matches!(validate(payload), Err(GenerationError::MalformedPayload(_))));
    }

    #[test]
    fn test_empty_ingredients_are_malformed() {
        let mut payload = clean_payload();
        payload["recipes"][1]["sideDish1"] = dish("ひじきの煮物", &[]);
        assert!(matches!(validate(payload), Err(GenerationError::MalformedPayload(_))));
    }

    #[test]
    fn test_missing_dish_is_malformed() {
        let mut payload = clean_payload();
        payload["recipes"][2].as_object_mut().unwrap().remove("sideDish2");
        assert!(matches!(validate(payload), Err(GenerationError::MalformedPayload(_))));
    }

    #[test]
    fn test_garbage_and_empty_text_are_malformed() {
        let validator = ResponseValidator::new();
        assert!(validator.validate_text(Category::Hearty, "not json").is_err());
        assert!(validator.validate_text(Category::Hearty, "   ").is_err());
    }

    #[test]
    fn test_blank_recipe_name_falls_back_to_main_dish() {
        let mut payload = clean_payload();
        payload["recipes"][0]["name"] = json!("");
        let batch = validate(payload).unwrap();
        assert_eq!(batch.recipes[0].name, "鶏の照り焼き");
    }

    #[test]
    fn test_policy_parses_from_config_strings() {
        assert_eq!("warn".parse::<ValidationPolicy>().unwrap(), ValidationPolicy::WarnAndServe);
        assert_eq!("RETRY".parse::<ValidationPolicy>().unwrap(), ValidationPolicy::RejectAndRetry);
        assert!("sometimes".parse::<ValidationPolicy>().is_err());
    }
}
