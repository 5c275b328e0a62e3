mod config;
mod db;
mod errors;
mod generation;
mod history;
mod llm_client;
mod models;
mod preset;
mod routes;
mod state;
mod validation;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::generation::cache::{RecipeCache, CACHE_CAPACITY};
use crate::generation::generator::LlmRecipeGenerator;
use crate::generation::orchestrator::GenerationOrchestrator;
use crate::history::repository::{HistoryRepository, InMemoryHistoryRepository, PgHistoryRepository};
use crate::history::HistoryStore;
use crate::llm_client::LlmClient;
use crate::preset::catalog::PresetCatalog;
use crate::preset::PresetPool;
use crate::routes::build_router;
use crate::state::AppState;

/// How long in-flight replenishment gets to finish once the server stops.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bento API v{}", env!("CARGO_PKG_VERSION"));

    // History: PostgreSQL when configured, otherwise process memory
    let repo: Arc<dyn HistoryRepository> = match &config.database_url {
        Some(url) => Arc::new(PgHistoryRepository::new(create_pool(url).await?)),
        None => {
            info!("DATABASE_URL not set, keeping recipe history in memory");
            Arc::new(InMemoryHistoryRepository::new())
        }
    };
    let history = HistoryStore::new(repo);

    // Preset catalog
    let catalog = match &config.preset_paths {
        Some((main, side)) => PresetCatalog::from_files(main, side)?,
        None => PresetCatalog::builtin()?,
    };
    let presets = PresetPool::new(Arc::new(catalog));
    info!(
        "Preset catalog loaded: {} main dishes, {} side dishes",
        presets.catalog().main_dish_count(),
        presets.catalog().side_dishes().len()
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.generator_timeout);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let mut orchestrator = GenerationOrchestrator::new(
        history.clone(),
        presets,
        Arc::new(RecipeCache::new(CACHE_CAPACITY, config.cache_max_age)),
        Arc::new(LlmRecipeGenerator::new(llm)),
        config.orchestrator_config(),
    );
    if let Some(seed) = config.rng_seed {
        info!("Preset RNG pinned to seed {seed}");
        orchestrator = orchestrator.with_seed(seed);
    }

    // Build app state
    let state = AppState {
        orchestrator: orchestrator.clone(),
        history,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    orchestrator.shutdown(SHUTDOWN_GRACE).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
