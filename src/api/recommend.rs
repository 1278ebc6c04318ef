use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::{error_response, ApiError};
use crate::catalog::enrich;
use crate::error::PipelineError;
use crate::models::{RecommendQuery, RecommendResponse};
use crate::state::AppState;

/// GET /api/recommend?query=...&enrich=bool - Hybrid retrieval + LLM recommendation:
///   1. BM25 + vector retrieval (concurrent, each degrades to empty on failure)
///   2. Merge, dedupe by text, cap context size
///   3. Generate with bounded retry
///   4. Parse into (title, explanation) pairs
///   5. Optionally enrich each title from the catalog
pub async fn recommend(
    State(state): State<AppState>,
    Query(req): Query<RecommendQuery>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Query cannot be empty.",
        ));
    }

    tracing::info!("Recommendation request: {query}");

    let outcome = state.pipeline.recommend(&query).await.map_err(|e| match e {
        PipelineError::EmptyQuery => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        PipelineError::Generation(_) => {
            tracing::error!("Recommendation failed: {e}");
            error_response(
                StatusCode::BAD_GATEWAY,
                "The recommendation engine is unavailable right now. Try a different query.",
            )
        }
    })?;

    tracing::info!(
        "Generated {} recommendations from {} documents ({} context chars)",
        outcome.recommendations.len(),
        outcome.documents_used,
        outcome.context_chars
    );

    let mut response = RecommendResponse::new(query, &outcome.recommendations);

    if req.enrich {
        response.recommendations = enrich(
            state.metadata_lookup(),
            outcome.recommendations.items(),
            state.config.catalog.timeout(),
            state.config.unmatched_policy,
        )
        .await;
    }

    Ok(Json(response))
}
