//! Warm cache of pre-generated recipes: one bounded FIFO queue per category.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::models::recipe::{Category, Recipe};

pub const CACHE_CAPACITY: usize = 5;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub recipe: Recipe,
    pub category: Category,
    pub created_at: Instant,
}

pub struct RecipeCache {
    queues: DashMap<Category, VecDeque<CacheEntry>>,
    capacity: usize,
    /// Entries older than this are dropped on the next read.
    max_age: Option<Duration>,
}

impl Default for RecipeCache {
    fn default() -> Self {
        Self::new(CACHE_CAPACITY, None)
    }
}

impl RecipeCache {
    pub fn new(capacity: usize, max_age: Option<Duration>) -> Self {
        Self {
            queues: DashMap::new(),
            capacity,
            max_age,
        }
    }

    /// Appends recipes to the tail. Returns how many old entries were dropped to stay
    /// within capacity.
    pub fn push(&self, category: Category, recipes: Vec<Recipe>) -> usize {
        let mut queue = self.queues.entry(category).or_default();
        let now = Instant::now();
        queue.extend(recipes.into_iter().map(|recipe| CacheEntry {
            recipe,
            category,
            created_at: now,
        }));

        let overflow = queue.len().saturating_sub(self.capacity);
        queue.drain(..overflow);
        if overflow > 0 {
            debug!("Cache for {category} over capacity, dropped {overflow} oldest");
        }
        overflow
    }

    pub fn len(&self, category: Category) -> usize {
        self.queues.get(&category).map_or(0, |q| q.len())
    }

    /// Recipes currently queued for `category`, oldest first.
    pub fn snapshot(&self, category: Category) -> Vec<Recipe> {
        self.queues
            .get(&category)
            .map(|q| q.iter().map(|e| e.recipe.clone()).collect())
            .unwrap_or_default()
    }

    /// Removes and returns the `count` oldest entries that are mutually compatible (no
    /// shared main dish or side-dish name). Skipped entries stay queued in order.
    /// Returns `None` and leaves the queue untouched if `count` such entries don't exist.
    pub fn take_compatible(&self, category: Category, count: usize) -> Option<Vec<Recipe>> {
        let mut queue = self.queues.get_mut(&category)?;

        if let Some(max_age) = self.max_age {
            let before = queue.len();
            queue.retain(|e| e.created_at.elapsed() < max_age);
            let stale = before - queue.len();
            if stale > 0 {
                debug!("Discarded {stale} stale cache entries for {category}");
            }
        }

        let mut picked: Vec<usize> = Vec::with_capacity(count);
        let mut mains: HashSet<&str> = HashSet::new();
        let mut sides: HashSet<&str> = HashSet::new();
        for (i, entry) in queue.iter().enumerate() {
            if picked.len() == count {
                break;
            }
            let recipe = &entry.recipe;
            let side_names = [recipe.side_dish1.name.as_str(), recipe.side_dish2.name.as_str()];
            if mains.contains(recipe.main_dish.name.as_str())
                || side_names.iter().any(|s| sides.contains(s))
            {
                continue;
            }
            mains.insert(recipe.main_dish.name.as_str());
            sides.extend(side_names);
            picked.push(i);
        }

        if picked.len() < count {
            return None;
        }

        // Remove back to front so earlier indices stay valid.
        let mut taken: Vec<Recipe> = picked
            .iter()
            .rev()
            .filter_map(|&i| queue.remove(i))
            .map(|e| e.recipe)
            .collect();
        taken.reverse();
        Some(taken)
    }
}
