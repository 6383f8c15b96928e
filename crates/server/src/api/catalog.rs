//! Catalog API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use cinedex_core::{Category, MediaRecord};

use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CatalogQueryParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogListResponse {
    pub category: Category,
    pub entries: Vec<MediaRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/catalog/{category}
///
/// List a category's catalog, or search titles with `?q=`.
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<CatalogListResponse>, impl IntoResponse> {
    let category: Category = match category.parse() {
        Ok(category) => category,
        Err(e) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("{}", e),
                }),
            ))
        }
    };

    let entries = state
        .catalog()
        .search(category, params.q.as_deref().unwrap_or_default());
    let total = entries.len();

    Ok(Json(CatalogListResponse {
        category,
        entries,
        total,
    }))
}
