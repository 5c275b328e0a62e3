//! Rolling per-category log of served recipes and the exclusion fingerprints derived from it.

pub mod cooking_method;
pub mod repository;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::history::cooking_method::{extract_cooking_method, extract_main_ingredient, CookingMethod};
use crate::history::repository::HistoryRepository;
use crate::models::recipe::{Category, Recipe};

/// Maximum entries kept per category.
pub const HISTORY_CAP: usize = 100;

/// Cooking-method fingerprint of each dish, computed once when the entry is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishFingerprints {
    pub main_dish: CookingMethod,
    pub side_dish1: CookingMethod,
    pub side_dish2: CookingMethod,
}

impl DishFingerprints {
    pub fn of(recipe: &Recipe) -> Self {
        Self {
            main_dish: extract_cooking_method(&recipe.main_dish.name),
            side_dish1: extract_cooking_method(&recipe.side_dish1.name),
            side_dish2: extract_cooking_method(&recipe.side_dish2.name),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CookingMethod> {
        [&self.main_dish, &self.side_dish1, &self.side_dish2].into_iter()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub category: Category,
    pub recipe: Recipe,
    pub cooking_methods: DishFingerprints,
    pub main_ingredient: String,
    pub served_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(recipe: Recipe, category: Category) -> Self {
        Self {
            category,
            cooking_methods: DishFingerprints::of(&recipe),
            main_ingredient: extract_main_ingredient(&recipe.main_dish),
            served_at: Utc::now(),
            recipe,
        }
    }
}

/// Everything the external generator is asked to avoid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionHints {
    pub recipe_names: Vec<String>,
    pub main_dishes: Vec<String>,
    pub side_dishes: Vec<String>,
    pub cooking_methods: Vec<String>,
    pub main_ingredients: Vec<String>,
}

/// Keeps the first occurrence of each value, preserving order.
fn dedup_preserving_order(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

#[derive(Clone)]
pub struct HistoryStore {
    repo: Arc<dyn HistoryRepository>,
}

impl HistoryStore {
    pub fn new(repo: Arc<dyn HistoryRepository>) -> Self {
        Self { repo }
    }

    pub async fn record(&self, recipe: &Recipe, category: Category) -> Result<()> {
        let entry = HistoryEntry::new(recipe.clone(), category);
        debug!(
            "Recording '{}' for {category} (methods: {}/{}/{})",
            recipe.name,
            entry.cooking_methods.main_dish,
            entry.cooking_methods.side_dish1,
            entry.cooking_methods.side_dish2
        );
        self.repo.append(entry, HISTORY_CAP).await
    }

    pub async fn recent_entries(&self, category: Category, limit: usize) -> Result<Vec<HistoryEntry>> {
        self.repo.recent(category, limit.min(HISTORY_CAP)).await
    }

    pub async fn recent_recipes(&self, category: Category, limit: usize) -> Result<Vec<Recipe>> {
        Ok(self
            .recent_entries(category, limit)
            .await?
            .into_iter()
            .map(|e| e.recipe)
            .collect())
    }

    pub async fn recent_main_dish_names(&self, category: Category, limit: usize) -> Result<Vec<String>> {
        let entries = self.recent_entries(category, limit).await?;
        Ok(entries.into_iter().map(|e| e.recipe.main_dish.name).collect())
    }

    pub async fn recent_side_dish_names(&self, category: Category, limit: usize) -> Result<Vec<String>> {
        let entries = self.recent_entries(category, limit).await?;
        Ok(dedup_preserving_order(entries.into_iter().flat_map(|e| {
            [e.recipe.side_dish1.name, e.recipe.side_dish2.name]
        })))
    }

    pub async fn recent_cooking_methods(&self, category: Category, limit: usize) -> Result<Vec<String>> {
        let entries = self.recent_entries(category, limit).await?;
        Ok(dedup_preserving_order(entries.iter().flat_map(|e| {
            e.cooking_methods
                .iter()
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })))
    }

    pub async fn recent_main_ingredients(&self, category: Category, limit: usize) -> Result<Vec<String>> {
        let entries = self.recent_entries(category, limit).await?;
        Ok(dedup_preserving_order(
            entries.into_iter().map(|e| e.main_ingredient),
        ))
    }

    /// All exclusion lists from a single read of the log.
    pub async fn exclusion_hints(&self, category: Category, limit: usize) -> Result<ExclusionHints> {
        let entries = self.recent_entries(category, limit).await?;
        Ok(ExclusionHints {
            recipe_names: dedup_preserving_order(entries.iter().map(|e| e.recipe.name.clone())),
            main_dishes: dedup_preserving_order(
                entries.iter().map(|e| e.recipe.main_dish.name.clone()),
            ),
            side_dishes: dedup_preserving_order(entries.iter().flat_map(|e| {
                [e.recipe.side_dish1.name.clone(), e.recipe.side_dish2.name.clone()]
            })),
            cooking_methods: dedup_preserving_order(
                entries
                    .iter()
                    .flat_map(|e| e.cooking_methods.iter().map(|m| m.as_str().to_string())),
            ),
            main_ingredients: dedup_preserving_order(
                entries.iter().map(|e| e.main_ingredient.clone()),
            ),
        })
    }
}
