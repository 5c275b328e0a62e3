//! History persistence. Append-then-trim per category; reads are most-recent-first.

use std::collections::VecDeque;

use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;

use crate::history::HistoryEntry;
use crate::models::recipe::{Category, Recipe};

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Inserts `entry` at the head of its category's log and trims the tail to `cap`.
    async fn append(&self, entry: HistoryEntry, cap: usize) -> Result<()>;

    /// Up to `limit` entries for `category`, newest first.
    async fn recent(&self, category: Category, limit: usize) -> Result<Vec<HistoryEntry>>;
}

/// Process-local history. The map is sharded, so each category is locked independently.
#[derive(Default)]
pub struct InMemoryHistoryRepository {
    logs: DashMap<Category, VecDeque<HistoryEntry>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn append(&self, entry: HistoryEntry, cap: usize) -> Result<()> {
        let mut log = self.logs.entry(entry.category).or_default();
        log.push_front(entry);
        log.truncate(cap);
        Ok(())
    }

    async fn recent(&self, category: Category, limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .logs
            .get(&category)
            .map(|log| log.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    category: String,
    recipe: sqlx::types::Json<Recipe>,
    cooking_methods: sqlx::types::Json<crate::history::DishFingerprints>,
    main_ingredient: String,
    served_at: chrono::DateTime<chrono::Utc>,
}

/// Postgres-backed history (`recipe_history` table, see migrations/).
#[derive(Clone)]
pub struct PgHistoryRepository {
    pool: PgPool,
}

impl PgHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRepository for PgHistoryRepository {
    async fn append(&self, entry: HistoryEntry, cap: usize) -> Result<()> {
        let category = entry.category.key();

        sqlx::query(
            r#"
            INSERT INTO recipe_history
                (id, category, recipe, cooking_methods, main_ingredient, served_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(category)
        .bind(sqlx::types::Json(&entry.recipe))
        .bind(sqlx::types::Json(&entry.cooking_methods))
        .bind(&entry.main_ingredient)
        .bind(entry.served_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert history entry")?;

        // Trim from the tail; seq is insertion order, so same-instant rows stay ordered.
        sqlx::query(
            r#"
            DELETE FROM recipe_history
            WHERE category = $1
              AND id NOT IN (
                  SELECT id FROM recipe_history
                  WHERE category = $1
                  ORDER BY seq DESC
                  LIMIT $2
              )
            "#,
        )
        .bind(category)
        .bind(cap as i64)
        .execute(&self.pool)
        .await
        .context("Failed to trim history")?;

        Ok(())
    }

    async fn recent(&self, category: Category, limit: usize) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT category, recipe, cooking_methods, main_ingredient, served_at
            FROM recipe_history
            WHERE category = $1
            ORDER BY seq DESC
            LIMIT $2
            "#,
        )
        .bind(category.key())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load history")?;

        rows.into_iter()
            .map(|row| {
                let category = row
                    .category
                    .parse::<Category>()
                    .with_context(|| format!("Corrupt category in history: {}", row.category))?;
                Ok(HistoryEntry {
                    category,
                    recipe: row.recipe.0,
                    cooking_methods: row.cooking_methods.0,
                    main_ingredient: row.main_ingredient,
                    served_at: row.served_at,
                })
            })
            .collect()
    }
}
