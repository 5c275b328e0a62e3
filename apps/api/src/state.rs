use crate::generation::orchestrator::GenerationOrchestrator;
use crate::history::HistoryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: GenerationOrchestrator,
    /// Same store the orchestrator records into; read directly by the history route.
    pub history: HistoryStore,
}
