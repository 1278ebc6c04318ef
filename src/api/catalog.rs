use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::{error_response, ApiError};
use crate::models::{ListResponse, MetadataQuery, MetadataResponse, TopAnime, TopCharacter};
use crate::state::AppState;

const TOP_LIMIT: usize = 50;

/// GET /api/metadata?title=... - Poster, score and MyAnimeList link for one title.
///
/// A miss or a catalog failure is reported in the body, never as an HTTP
/// error, so one broken card cannot break the page.
pub async fn metadata(
    State(state): State<AppState>,
    Query(req): Query<MetadataQuery>,
) -> Result<Json<MetadataResponse>, ApiError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Title cannot be empty.",
        ));
    }

    let response = match state.metadata_lookup().lookup(title).await {
        Ok(Some(metadata)) => MetadataResponse {
            found: true,
            metadata: Some(metadata),
            error: None,
        },
        Ok(None) => MetadataResponse {
            found: false,
            metadata: None,
            error: Some("Not found".to_string()),
        },
        Err(e) => {
            tracing::warn!("Metadata lookup failed for '{title}': {e:#}");
            MetadataResponse {
                found: false,
                metadata: None,
                error: Some("Details unavailable".to_string()),
            }
        }
    };

    Ok(Json(response))
}

/// GET /api/top-anime - Live top 50 ranking.
pub async fn top_anime(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<TopAnime>>, ApiError> {
    let data = state.catalog.top_anime(TOP_LIMIT).await.map_err(|e| {
        tracing::error!("Top anime fetch failed: {e:#}");
        error_response(StatusCode::BAD_GATEWAY, format!("Jikan API error: {e}"))
    })?;
    Ok(Json(ListResponse {
        success: true,
        data,
    }))
}

/// GET /api/top-characters - Live top 50 characters by favorites.
pub async fn top_characters(
    State(state): State<AppState>,
) -> Result<Json<ListResponse<TopCharacter>>, ApiError> {
    let data = state.catalog.top_characters(TOP_LIMIT).await.map_err(|e| {
        tracing::error!("Top characters fetch failed: {e:#}");
        error_response(StatusCode::BAD_GATEWAY, format!("Jikan API error: {e}"))
    })?;
    Ok(Json(ListResponse {
        success: true,
        data,
    }))
}
