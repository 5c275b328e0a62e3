//! Generation Orchestrator: decides where each batch of bentos comes from.
//!
//! Flow for one request: busy check → cache → preset pool → live generator → fallback →
//! record history → release busy flag → schedule background replenishment.
//!
//! Every tier failure is recovered here; a caller always gets either a full batch or
//! `BatchOutcome::InProgress`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::{DashMap, DashSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::errors::GenerationError;
use crate::generation::cache::RecipeCache;
use crate::generation::fallback::fallback_batch;
use crate::generation::generator::RecipeGenerator;
use crate::history::{ExclusionHints, HistoryStore, HISTORY_CAP};
use crate::models::recipe::{Category, Recipe, Season};
use crate::preset::{PresetPool, MAIN_DISH_EXCLUSION_WINDOW};
use crate::validation::{ResponseValidator, ValidatedBatch, ValidationPolicy, ValidationWarning, BATCH_SIZE};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub generator_timeout: Duration,
    pub validation_policy: ValidationPolicy,
    /// Whether fallback batches count as "served" in history.
    pub record_fallback_batches: bool,
    /// Optional (min, max) pause before answering from the cache or presets.
    pub presentation_delay: Option<(Duration, Duration)>,
    /// History depth used for the generator's exclusion hints.
    pub hint_history_limit: usize,
    /// Pins the season used for preset filtering; defaults to today's.
    pub season_override: Option<Season>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            generator_timeout: Duration::from_secs(60),
            validation_policy: ValidationPolicy::default(),
            record_fallback_batches: false,
            presentation_delay: None,
            hint_history_limit: HISTORY_CAP,
            season_override: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    Cache,
    Preset,
    Live,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub category: Category,
    pub source: RecipeSource,
    pub recipes: Vec<Recipe>,
    pub warnings: Vec<ValidationWarning>,
}

#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// Another request for the same category is still running. Nothing was done.
    InProgress,
    Served(BatchResponse),
}

/// Holds a category in a flag set for as long as it lives.
struct CategoryGuard {
    set: Arc<DashSet<Category>>,
    category: Category,
}

impl CategoryGuard {
    fn acquire(set: &Arc<DashSet<Category>>, category: Category) -> Option<Self> {
        set.insert(category).then(|| Self {
            set: Arc::clone(set),
            category,
        })
    }
}

impl Drop for CategoryGuard {
    fn drop(&mut self) {
        self.set.remove(&self.category);
    }
}

#[derive(Clone)]
pub struct GenerationOrchestrator {
    history: HistoryStore,
    presets: PresetPool,
    cache: Arc<RecipeCache>,
    generator: Arc<dyn RecipeGenerator>,
    validator: ResponseValidator,
    config: Arc<OrchestratorConfig>,
    /// Categories with a foreground request in flight.
    busy: Arc<DashSet<Category>>,
    /// Categories with a background replenishment in flight.
    replenishing: Arc<DashSet<Category>>,
    /// One lock per category, held while serving and while replenishing, so the two never
    /// overlap for the same category.
    lanes: Arc<DashMap<Category, Arc<tokio::sync::Mutex<()>>>>,
    rng: Arc<Mutex<ChaCha8Rng>>,
    tasks: Arc<tokio::sync::Mutex<JoinSet<()>>>,
}

impl GenerationOrchestrator {
    pub fn new(
        history: HistoryStore,
        presets: PresetPool,
        cache: Arc<RecipeCache>,
        generator: Arc<dyn RecipeGenerator>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            history,
            presets,
            cache,
            generator,
            validator: ResponseValidator::new(),
            config: Arc::new(config),
            busy: Arc::new(DashSet::new()),
            replenishing: Arc::new(DashSet::new()),
            lanes: Arc::new(DashMap::new()),
            rng: Arc::new(Mutex::new(ChaCha8Rng::from_entropy())),
            tasks: Arc::new(tokio::sync::Mutex::new(JoinSet::new())),
        }
    }

    /// Replaces the entropy-seeded RNG, making preset draws reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed)));
        self
    }

    pub fn is_busy(&self, category: Category) -> bool {
        self.busy.contains(&category)
    }

    pub fn cache(&self) -> &RecipeCache {
        &self.cache
    }

    fn lane(&self, category: Category) -> Arc<tokio::sync::Mutex<()>> {
        self.lanes.entry(category).or_default().value().clone()
    }

    /// Serves one batch for `category`, or reports that one is already being prepared.
    pub async fn request_batch(&self, category: Category) -> BatchOutcome {
        let Some(guard) = CategoryGuard::acquire(&self.busy, category) else {
            info!("Batch for {category} already in progress, ignoring request");
            return BatchOutcome::InProgress;
        };

        let response = {
            let lane = self.lane(category);
            let _serial = lane.lock().await;
            self.serve(category).await
        };
        // Lane and busy flag are both free before replenishment is scheduled.
        drop(guard);

        info!(
            "Served {} {category} recipes from {:?} ({} warnings)",
            response.recipes.len(),
            response.source,
            response.warnings.len()
        );

        self.schedule_replenishment(category).await;
        BatchOutcome::Served(response)
    }

    async fn serve(&self, category: Category) -> BatchResponse {
        match self.draw_from_cache(category) {
            Ok(recipes) => return self.deliver(category, RecipeSource::Cache, recipes, Vec::new()).await,
            Err(e) => debug!("Cache miss for {category}: {e}"),
        }

        match self.draw_from_presets(category).await {
            Ok(recipes) => return self.deliver(category, RecipeSource::Preset, recipes, Vec::new()).await,
            Err(e) => debug!("Preset pool miss for {category}: {e}"),
        }

        match self.generate_live(category).await {
            Ok(batch) => self.deliver(category, RecipeSource::Live, batch.recipes, batch.warnings).await,
            Err(e) => {
                warn!("Live generation for {category} failed, serving fallback: {e}");
                self.deliver(category, RecipeSource::Fallback, fallback_batch(category), Vec::new())
                    .await
            }
        }
    }

    fn draw_from_cache(&self, category: Category) -> Result<Vec<Recipe>, GenerationError> {
        self.cache
            .take_compatible(category, BATCH_SIZE)
            .ok_or(GenerationError::SourceExhausted)
    }

    async fn draw_from_presets(&self, category: Category) -> Result<Vec<Recipe>, GenerationError> {
        let recent = self
            .history
            .recent_recipes(category, MAIN_DISH_EXCLUSION_WINDOW)
            .await
            .unwrap_or_else(|e| {
                warn!("Could not read {category} history, drawing presets without exclusions: {e:#}");
                Vec::new()
            });
        let season = self.config.season_override.unwrap_or_else(Season::current);

        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| {
            warn!("Preset RNG lock was poisoned, recovering it");
            poisoned.into_inner()
        });
        self.presets
            .sample_batch(category, season, &recent, BATCH_SIZE, &mut *rng)
            .ok_or(GenerationError::SourceExhausted)
    }

    async fn generate_live(&self, category: Category) -> Result<ValidatedBatch, GenerationError> {
        let hints = self.hints_for(category, false).await;
        let attempts = match self.config.validation_policy {
            ValidationPolicy::WarnAndServe => 1,
            ValidationPolicy::RejectAndRetry => 2,
        };

        for attempt in 1..=attempts {
            let batch = self.call_generator(category, &hints).await?;
            if batch.is_clean() || self.config.validation_policy == ValidationPolicy::WarnAndServe {
                return Ok(batch);
            }
            warn!(
                "Attempt {attempt}/{attempts} for {category} returned {} warnings, rejecting",
                batch.warnings.len()
            );
        }

        Err(GenerationError::MalformedPayload(format!(
            "every attempt for {category} failed validation"
        )))
    }

    /// One bounded generator call, parsed and validated.
    async fn call_generator(&self, category: Category, hints: &ExclusionHints) -> Result<ValidatedBatch, GenerationError> {
        let timeout = self.config.generator_timeout;
        let text = tokio::time::timeout(timeout, self.generator.generate(category, hints))
            .await
            .map_err(|_| GenerationError::GeneratorUnavailable(format!("no response within {timeout:?}")))??;
        self.validator.validate_text(category, &text)
    }

    /// Exclusion hints from history. When `include_cached` is set, recipes already
    /// waiting in the cache are folded in so replenishment doesn't duplicate them.
    async fn hints_for(&self, category: Category, include_cached: bool) -> ExclusionHints {
        let mut hints = self
            .history
            .exclusion_hints(category, self.config.hint_history_limit)
            .await
            .unwrap_or_else(|e| {
                warn!("Could not read {category} history, generating without exclusions: {e:#}");
                ExclusionHints::default()
            });

        if include_cached {
            for recipe in self.cache.snapshot(category) {
                hints.recipe_names.push(recipe.name.clone());
                hints.main_dishes.push(recipe.main_dish.name.clone());
                hints
                    .side_dishes
                    .extend(recipe.side_dishes().iter().map(|d| d.name.clone()));
            }
            for list in [&mut hints.recipe_names, &mut hints.main_dishes, &mut hints.side_dishes] {
                let mut seen = HashSet::new();
                list.retain(|name| seen.insert(name.clone()));
            }
        }
        hints
    }

    async fn deliver(
        &self,
        category: Category,
        source: RecipeSource,
        recipes: Vec<Recipe>,
        warnings: Vec<ValidationWarning>,
    ) -> BatchResponse {
        if matches!(source, RecipeSource::Cache | RecipeSource::Preset) {
            self.presentation_pause().await;
        }

        if source != RecipeSource::Fallback || self.config.record_fallback_batches {
            for recipe in &recipes {
                if let Err(e) = self.history.record(recipe, category).await {
                    warn!("Failed to record '{}' in {category} history: {e:#}", recipe.name);
                }
            }
        }

        BatchResponse {
            category,
            source,
            recipes,
            warnings,
        }
    }

    async fn presentation_pause(&self) {
        let Some((min, max)) = self.config.presentation_delay else {
            return;
        };
        let delay = if max > min {
            self.rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .gen_range(min..=max)
        } else {
            min
        };
        tokio::time::sleep(delay).await;
    }

    // ────────────────────────────────────────────────────────────────────────
    // Background replenishment
    // ────────────────────────────────────────────────────────────────────────

    async fn schedule_replenishment(&self, category: Category) {
        let this = self.clone();
        let mut tasks = self.tasks.lock().await;
        while let Some(finished) = tasks.try_join_next() {
            if let Err(e) = finished {
                warn!("Replenishment task ended abnormally: {e}");
            }
        }
        tasks.spawn(async move {
            this.replenish(category).await;
        });
    }

    /// Generates one batch into the cache. Returns how many recipes were cached.
    /// At most one replenishment per category runs at a time; extra calls return 0.
    /// Waits for an in-flight foreground request for the same category to finish first.
    pub async fn replenish(&self, category: Category) -> usize {
        let Some(_guard) = CategoryGuard::acquire(&self.replenishing, category) else {
            debug!("Replenishment for {category} already running");
            return 0;
        };
        let lane = self.lane(category);
        let _serial = lane.lock().await;

        let hints = self.hints_for(category, true).await;
        let batch = match self.call_generator(category, &hints).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Replenishment for {category} failed: {e}");
                return 0;
            }
        };

        if !batch.is_clean() && self.config.validation_policy == ValidationPolicy::RejectAndRetry {
            warn!(
                "Replenishment batch for {category} has {} warnings, not caching it",
                batch.warnings.len()
            );
            return 0;
        }

        let count = batch.recipes.len();
        let dropped = self.cache.push(category, batch.recipes);
        info!(
            "Cached {count} {category} recipes ({} queued, {dropped} dropped)",
            self.cache.len(category)
        );
        count
    }

    /// Waits until every scheduled replenishment has finished.
    pub async fn wait_for_replenishment(&self) {
        let mut tasks = self.tasks.lock().await;
        while let Some(finished) = tasks.join_next().await {
            if let Err(e) = finished {
                warn!("Replenishment task ended abnormally: {e}");
            }
        }
    }

    /// Gives in-flight replenishment `grace` to finish, then aborts whatever is left.
    pub async fn shutdown(&self, grace: Duration) {
        if tokio::time::timeout(grace, self.wait_for_replenishment())
            .await
            .is_err()
        {
            let mut tasks = self.tasks.lock().await;
            warn!("Aborting {} unfinished replenishment tasks", tasks.len());
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }
        info!("Generation orchestrator stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use tokio::sync::Notify;

    use super::*;
    use crate::generation::generator::fakes::{Reply, ScriptedGenerator};
    use crate::history::repository::InMemoryHistoryRepository;
    use crate::preset::catalog::PresetCatalog;
    use crate::validation::tests::clean_payload;

    struct Harness {
        orchestrator: GenerationOrchestrator,
        history: HistoryStore,
        generator: Arc<ScriptedGenerator>,
    }

    fn harness(catalog: PresetCatalog, generator: ScriptedGenerator, config: OrchestratorConfig) -> Harness {
        let history = HistoryStore::new(Arc::new(InMemoryHistoryRepository::new()));
        let generator = Arc::new(generator);
        let orchestrator = GenerationOrchestrator::new(
            history.clone(),
            PresetPool::new(Arc::new(catalog)),
            Arc::new(RecipeCache::default()),
            generator.clone(),
            config,
        )
        .with_seed(7);
        Harness {
            orchestrator,
            history,
            generator,
        }
    }

    fn summer() -> OrchestratorConfig {
        OrchestratorConfig {
            season_override: Some(Season::Summer),
            ..Default::default()
        }
    }

    fn clean() -> Reply {
        Reply::Payload(clean_payload().to_string())
    }

    /// The clean payload with its first main dish renamed to a herb dish lacking herbs.
    fn warned() -> Reply {
        let mut payload = clean_payload();
        payload["recipes"][0]["mainDish"]["name"] = "カジキのハーブ焼き".into();
        Reply::Payload(payload.to_string())
    }

    fn served(outcome: BatchOutcome) -> BatchResponse {
        match outcome {
            BatchOutcome::Served(response) => response,
            BatchOutcome::InProgress => panic!("expected a served batch"),
        }
    }

    #[tokio::test]
    async fn test_empty_cache_serves_diverse_presets_and_records_them() {
        let h = harness(
            PresetCatalog::builtin().unwrap(),
            ScriptedGenerator::always(Reply::Unavailable),
            summer(),
        );

        let response = served(h.orchestrator.request_batch(Category::FishMain).await);
        assert_eq!(response.source, RecipeSource::Preset);
        assert_eq!(response.recipes.len(), 3);

        let mains: HashSet<_> = response.recipes.iter().map(|r| r.main_dish.name.as_str()).collect();
        let sides: HashSet<_> = response
            .recipes
            .iter()
            .flat_map(|r| r.side_dishes())
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(mains.len(), 3);
        assert_eq!(sides.len(), 6);

        let recorded = h.history.recent_recipes(Category::FishMain, 10).await.unwrap();
        assert_eq!(recorded.len(), 3);
        let served_ids: HashSet<_> = response.recipes.iter().map(|r| r.id).collect();
        assert!(recorded.iter().all(|r| served_ids.contains(&r.id)));
        assert_eq!(recorded[0].id, response.recipes[2].id);

        assert!(!h.orchestrator.is_busy(Category::FishMain));
        h.orchestrator.wait_for_replenishment().await;
        assert_eq!(h.generator.calls(), 1);
        assert_eq!(h.orchestrator.cache().len(Category::FishMain), 0);
    }

    #[tokio::test]
    async fn test_second_request_while_busy_is_a_no_op() {
        let gate = Arc::new(Notify::new());
        let h = harness(
            PresetCatalog::default(),
            ScriptedGenerator::gated(clean(), gate.clone()),
            OrchestratorConfig::default(),
        );

        let first = {
            let orchestrator = h.orchestrator.clone();
            tokio::spawn(async move { orchestrator.request_batch(Category::Hearty).await })
        };
        while !h.orchestrator.is_busy(Category::Hearty) {
            tokio::task::yield_now().await;
        }

        let second = h.orchestrator.request_batch(Category::Hearty).await;
        assert!(matches!(second, BatchOutcome::InProgress));
        assert!(h.history.recent_recipes(Category::Hearty, 10).await.unwrap().is_empty());

        // Other categories are unaffected.
        assert!(!h.orchestrator.is_busy(Category::Simple));

        gate.notify_one();
        let response = served(first.await.unwrap());
        assert_eq!(response.source, RecipeSource::Live);
        assert!(!h.orchestrator.is_busy(Category::Hearty));
        assert_eq!(h.history.recent_recipes(Category::Hearty, 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_replenishment_waits_for_in_flight_request() {
        let gate = Arc::new(Notify::new());
        let h = harness(
            PresetCatalog::default(),
            ScriptedGenerator::gated(clean(), gate.clone()),
            OrchestratorConfig::default(),
        );

        let first = {
            let orchestrator = h.orchestrator.clone();
            tokio::spawn(async move { orchestrator.request_batch(Category::Hearty).await })
        };
        while !h.orchestrator.is_busy(Category::Hearty) {
            tokio::task::yield_now().await;
        }

        let refill = {
            let orchestrator = h.orchestrator.clone();
            tokio::spawn(async move { orchestrator.replenish(Category::Hearty).await })
        };
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(h.generator.calls(), 1);
        assert!(!refill.is_finished());
        assert_eq!(h.orchestrator.cache().len(Category::Hearty), 0);

        gate.notify_one();
        assert_eq!(served(first.await.unwrap()).source, RecipeSource::Live);
        assert_eq!(refill.await.unwrap(), 3);
        assert!(h.generator.calls() >= 2);

        // The request released its lane before scheduling its own replenishment.
        h.orchestrator.wait_for_replenishment().await;
        assert!(!h.orchestrator.is_busy(Category::Hearty));
    }

    #[tokio::test]
    async fn test_cancelled_request_releases_busy_flag() {
        let gate = Arc::new(Notify::new());
        let h = harness(
            PresetCatalog::default(),
            ScriptedGenerator::gated(clean(), gate),
            OrchestratorConfig::default(),
        );

        let pending = {
            let orchestrator = h.orchestrator.clone();
            tokio::spawn(async move { orchestrator.request_batch(Category::Simple).await })
        };
        while !h.orchestrator.is_busy(Category::Simple) {
            tokio::task::yield_now().await;
        }

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert!(!h.orchestrator.is_busy(Category::Simple));

        let response = served(h.orchestrator.request_batch(Category::Simple).await);
        assert_eq!(response.source, RecipeSource::Live);
        assert_eq!(h.history.recent_recipes(Category::Simple, 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_poisoned_rng_still_serves_presets() {
        let h = harness(
            PresetCatalog::builtin().unwrap(),
            ScriptedGenerator::always(Reply::Unavailable),
            summer(),
        );
        let rng = Arc::clone(&h.orchestrator.rng);
        let _ = std::thread::spawn(move || {
            let _held = rng.lock().unwrap();
            panic!("poison the preset rng");
        })
        .join();
        assert!(h.orchestrator.rng.is_poisoned());

        let response = served(h.orchestrator.request_batch(Category::Omakase).await);
        assert_eq!(response.source, RecipeSource::Preset);
        assert_eq!(response.recipes.len(), 3);
    }

    #[tokio::test]
    async fn test_live_batch_when_cache_and_presets_are_empty() {
        let h = harness(PresetCatalog::default(), ScriptedGenerator::always(clean()), OrchestratorConfig::default());

        let response = served(h.orchestrator.request_batch(Category::Omakase).await);
        assert_eq!(response.source, RecipeSource::Live);
        assert_eq!(response.recipes.len(), 3);
        assert!(response.warnings.is_empty());
        assert!(response.recipes.iter().all(|r| r.category == Category::Omakase));
    }

    #[tokio::test]
    async fn test_warnings_are_served_under_default_policy() {
        let h = harness(PresetCatalog::default(), ScriptedGenerator::always(warned()), OrchestratorConfig::default());

        let response = served(h.orchestrator.request_batch(Category::FishMain).await);
        assert_eq!(response.source, RecipeSource::Live);
        assert_eq!(response.warnings.len(), 1);
        assert!(matches!(
            &response.warnings[0],
            ValidationWarning::IngredientMismatch { token, .. } if token == "ハーブ"
        ));
    }

    #[tokio::test]
    async fn test_generator_outage_serves_unrecorded_fallback() {
        let h = harness(
            PresetCatalog::default(),
            ScriptedGenerator::always(Reply::Unavailable),
            OrchestratorConfig::default(),
        );

        let response = served(h.orchestrator.request_batch(Category::Simple).await);
        assert_eq!(response.source, RecipeSource::Fallback);
        assert_eq!(response.recipes, fallback_batch(Category::Simple));
        assert!(h.history.recent_recipes(Category::Simple, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_can_be_recorded() {
        let h = harness(
            PresetCatalog::default(),
            ScriptedGenerator::always(Reply::Payload("申し訳ありません".to_string())),
            OrchestratorConfig {
                record_fallback_batches: true,
                ..Default::default()
            },
        );

        let response = served(h.orchestrator.request_batch(Category::Hearty).await);
        assert_eq!(response.source, RecipeSource::Fallback);
        assert_eq!(h.history.recent_recipes(Category::Hearty, 10).await.unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_generator_times_out_to_fallback() {
        let h = harness(
            PresetCatalog::default(),
            ScriptedGenerator::always(Reply::Hang),
            OrchestratorConfig {
                generator_timeout: Duration::from_secs(5),
                ..Default::default()
            },
        );

        let response = served(h.orchestrator.request_batch(Category::Omakase).await);
        assert_eq!(response.source, RecipeSource::Fallback);
        assert!(!h.orchestrator.is_busy(Category::Omakase));
        h.orchestrator.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_reject_policy_retries_once() {
        let h = harness(
            PresetCatalog::default(),
            ScriptedGenerator::scripted(vec![warned(), clean()], Reply::Unavailable),
            OrchestratorConfig {
                validation_policy: ValidationPolicy::RejectAndRetry,
                ..Default::default()
            },
        );

        let response = served(h.orchestrator.request_batch(Category::FishMain).await);
        assert_eq!(response.source, RecipeSource::Live);
        assert!(response.warnings.is_empty());
        assert!(response.recipes.iter().all(|r| r.main_dish.name != "カジキのハーブ焼き"));
    }

    #[tokio::test]
    async fn test_reject_policy_falls_back_after_second_warning() {
        let h = harness(
            PresetCatalog::default(),
            ScriptedGenerator::always(warned()),
            OrchestratorConfig {
                validation_policy: ValidationPolicy::RejectAndRetry,
                ..Default::default()
            },
        );

        let response = served(h.orchestrator.request_batch(Category::FishMain).await);
        assert_eq!(response.source, RecipeSource::Fallback);

        h.orchestrator.wait_for_replenishment().await;
        assert_eq!(h.orchestrator.cache().len(Category::FishMain), 0);
    }

    #[tokio::test]
    async fn test_replenishment_feeds_the_next_request() {
        let h = harness(PresetCatalog::default(), ScriptedGenerator::always(clean()), OrchestratorConfig::default());

        let first = served(h.orchestrator.request_batch(Category::Omakase).await);
        assert_eq!(first.source, RecipeSource::Live);
        h.orchestrator.wait_for_replenishment().await;
        assert_eq!(h.orchestrator.cache().len(Category::Omakase), 3);

        let second = served(h.orchestrator.request_batch(Category::Omakase).await);
        assert_eq!(second.source, RecipeSource::Cache);
        assert_eq!(h.history.recent_recipes(Category::Omakase, 10).await.unwrap().len(), 6);
        h.orchestrator.wait_for_replenishment().await;
        assert_eq!(h.generator.calls(), 3);
    }

    #[tokio::test]
    async fn test_cache_stays_bounded_under_repeated_replenishment() {
        let h = harness(PresetCatalog::default(), ScriptedGenerator::always(clean()), OrchestratorConfig::default());

        for _ in 0..4 {
            assert_eq!(h.orchestrator.replenish(Category::Simple).await, 3);
            assert!(h.orchestrator.cache().len(Category::Simple) <= 5);
        }
        assert_eq!(h.orchestrator.cache().len(Category::Simple), 5);
    }
}
