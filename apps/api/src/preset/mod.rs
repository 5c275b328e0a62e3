//! Preset Pool: assembles bento recipes from the static catalog without any LLM call.
//!
//! Algorithm per recipe:
//! 1. Season-appropriate main dishes not among the last 5 served (or already in this batch)
//! 2. Uniform random main dish
//! 3. Season-appropriate side dish 1 (not already in this batch)
//! 4. Side dish 2 with a non-equivalent cooking method; relaxes to "any other side dish"
//!    when the catalog leaves nothing else
//! 5. Name from the main dish; prep time and calories summed; no tips

pub mod catalog;
pub mod method_groups;

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::history::cooking_method::extract_cooking_method;
use crate::models::recipe::{Category, Recipe, Season};
use crate::preset::catalog::{PresetCatalog, PresetMainDish, PresetSideDish};
use crate::preset::method_groups::{canonical_method, methods_equivalent};

/// How many of the most recent history recipes block a main dish.
pub const MAIN_DISH_EXCLUSION_WINDOW: usize = 5;

#[derive(Clone)]
pub struct PresetPool {
    catalog: Arc<PresetCatalog>,
}

/// Canonical name-derived method of a dish, or `None` when the name has no known method.
fn canonical_fingerprint(dish_name: &str) -> Option<String> {
    let method = extract_cooking_method(dish_name);
    (!method.is_unknown()).then(|| canonical_method(method.as_str()).to_string())
}

impl PresetPool {
    pub fn new(catalog: Arc<PresetCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    /// Draws one recipe. `recent` is the category history, newest first; `batch` holds the
    /// recipes already drawn for the current batch. Returns `None` when the pool is exhausted.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        category: Category,
        season: Season,
        recent: &[Recipe],
        batch: &[Recipe],
        rng: &mut R,
    ) -> Option<Recipe> {
        let excluded_mains: HashSet<&str> = recent
            .iter()
            .take(MAIN_DISH_EXCLUSION_WINDOW)
            .chain(batch.iter())
            .map(|r| r.main_dish.name.as_str())
            .collect();

        let mains: Vec<&PresetMainDish> = self
            .catalog
            .main_dishes(category)
            .iter()
            .filter(|m| season.admits(m.season))
            .filter(|m| {
                !excluded_mains.contains(m.name.as_str())
                    && !excluded_mains.contains(m.dish.name.as_str())
            })
            .collect();

        let Some(main) = mains.choose(rng).copied() else {
            debug!("Preset pool exhausted for {category}: no eligible main dish");
            return None;
        };

        let batch_sides: HashSet<&str> = batch
            .iter()
            .flat_map(|r| r.side_dishes())
            .map(|d| d.name.as_str())
            .collect();
        let batch_methods: HashSet<String> = batch
            .iter()
            .flat_map(|r| r.side_dishes())
            .filter_map(|d| canonical_fingerprint(&d.name))
            .collect();

        let sides: Vec<&PresetSideDish> = self
            .catalog
            .side_dishes()
            .iter()
            .filter(|s| season.admits(s.season))
            .filter(|s| !batch_sides.contains(s.name.as_str()))
            .collect();

        let fresh_method = |s: &&PresetSideDish| {
            canonical_fingerprint(&s.name).map_or(true, |m| !batch_methods.contains(&m))
        };

        let side1_pool: Vec<&PresetSideDish> = sides.iter().copied().filter(fresh_method).collect();
        let side1 = if side1_pool.is_empty() {
            sides.choose(rng).copied()
        } else {
            side1_pool.choose(rng).copied()
        };
        let Some(side1) = side1 else {
            debug!("Preset pool exhausted for {category}: no eligible side dish");
            return None;
        };

        let side1_fingerprint = extract_cooking_method(&side1.name);
        let strict: Vec<&PresetSideDish> = sides
            .iter()
            .copied()
            .filter(|s| s.name != side1.name)
            .filter(|s| !methods_equivalent(&s.cooking_method, &side1.cooking_method))
            .filter(|s| !extract_cooking_method(&s.name).same_as(&side1_fingerprint))
            .collect();
        let preferred: Vec<&PresetSideDish> = strict.iter().copied().filter(fresh_method).collect();

        let side2 = if !preferred.is_empty() {
            preferred.choose(rng).copied()
        } else if !strict.is_empty() {
            strict.choose(rng).copied()
        } else {
            debug!(
                "No side dish with a method distinct from '{}' for {category}; relaxing",
                side1.cooking_method
            );
            let relaxed: Vec<&PresetSideDish> = sides
                .iter()
                .copied()
                .filter(|s| s.name != side1.name)
                .collect();
            relaxed.choose(rng).copied()
        };
        let Some(side2) = side2 else {
            debug!("Preset pool exhausted for {category}: only one side dish available");
            return None;
        };

        Some(assemble(category, main, side1, side2))
    }

    /// Draws `count` recipes, each excluding the ones drawn before it. All or nothing.
    pub fn sample_batch<R: Rng + ?Sized>(
        &self,
        category: Category,
        season: Season,
        recent: &[Recipe],
        count: usize,
        rng: &mut R,
    ) -> Option<Vec<Recipe>> {
        let mut batch: Vec<Recipe> = Vec::with_capacity(count);
        for _ in 0..count {
            let recipe = self.sample(category, season, recent, &batch, rng)?;
            batch.push(recipe);
        }
        Some(batch)
    }
}

fn assemble(
    category: Category,
    main: &PresetMainDish,
    side1: &PresetSideDish,
    side2: &PresetSideDish,
) -> Recipe {
    Recipe {
        id: Recipe::stable_id(category, &main.dish.name, &side1.dish.name, &side2.dish.name),
        name: main.name.clone(),
        description: main.description.clone(),
        category,
        main_dish: main.dish.clone(),
        side_dish1: side1.dish.clone(),
        side_dish2: side2.dish.clone(),
        prep_time: main.prep_time + side1.prep_time + side2.prep_time,
        calories: main.calories + side1.calories + side2.calories,
        difficulty: main.difficulty,
        tips: Vec::new(),
        is_favorite: false,
    }
}
