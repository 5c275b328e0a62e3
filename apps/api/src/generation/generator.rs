//! Recipe Generator: the external source of fresh bentos.
//!
//! The orchestrator only sees `RecipeGenerator`: a category and exclusion hints go in,
//! raw text comes out. Parsing and validation happen downstream in `ResponseValidator`.

use async_trait::async_trait;
use tracing::info;

use crate::errors::GenerationError;
use crate::generation::prompts::{build_recipe_prompt, RECIPE_SYSTEM};
use crate::history::ExclusionHints;
use crate::llm_client::LlmClient;
use crate::models::recipe::Category;

#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    /// Asks for one batch of recipes for `category`, steering away from `hints`.
    async fn generate(&self, category: Category, hints: &ExclusionHints) -> Result<String, GenerationError>;
}

/// Generator backed by the Anthropic Messages API.
pub struct LlmRecipeGenerator {
    llm: LlmClient,
}

impl LlmRecipeGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl RecipeGenerator for LlmRecipeGenerator {
    async fn generate(&self, category: Category, hints: &ExclusionHints) -> Result<String, GenerationError> {
        let prompt = build_recipe_prompt(category, hints);
        info!(
            "Requesting {category} batch (avoiding {} mains, {} sides)",
            hints.main_dishes.len(),
            hints.side_dishes.len()
        );
        Ok(self.llm.complete(&prompt, RECIPE_SYSTEM).await?)
    }
}
