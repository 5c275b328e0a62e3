use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::AppError;
use crate::generation::orchestrator::BatchOutcome;
use crate::history::HISTORY_CAP;
use crate::models::recipe::{Category, Recipe};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub category: Category,
    pub recipes: Vec<Recipe>,
}

fn parse_category(raw: &str) -> Result<Category, AppError> {
    raw.parse::<Category>()
        .map_err(|e| AppError::NotFound(e.to_string()))
}

/// POST /api/v1/recipes/:category/batch
///
/// Serves three bentos. 202 with `{"status": "in_progress"}` while another request for
/// the same category is still being prepared.
pub async fn handle_request_batch(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Response, AppError> {
    let category = parse_category(&category)?;

    Ok(match state.orchestrator.request_batch(category).await {
        BatchOutcome::Served(response) => Json(response).into_response(),
        BatchOutcome::InProgress => {
            (StatusCode::ACCEPTED, Json(json!({ "status": "in_progress" }))).into_response()
        }
    })
}

/// GET /api/v1/recipes/:category/history?limit=N
pub async fn handle_history(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let category = parse_category(&category)?;
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit == 0 || limit > HISTORY_CAP {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {HISTORY_CAP}"
        )));
    }

    let recipes = state.history.recent_recipes(category, limit).await?;
    Ok(Json(HistoryResponse { category, recipes }))
}
