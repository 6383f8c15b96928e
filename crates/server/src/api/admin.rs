//! Administrative API: drive the indexer and manage catalogs.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use cinedex_core::{
    Category, ChannelRef, IndexError, IndexRequest, IndexStatus, MediaRequest, ProgressNotifier,
};

use super::catalog::{ErrorResponse, SuccessResponse};
use super::middleware::AuthUser;
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartIndexRequest {
    pub channel_id: i64,
    pub last_message_id: i64,
}

#[derive(Debug, Serialize)]
pub struct StartIndexResponse {
    pub channel: ChannelRef,
    pub category: Category,
    pub upper_message_id: i64,
    pub resume_offset: u64,
}

#[derive(Debug, Deserialize)]
pub struct SetOffsetRequest {
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct OffsetResponse {
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancel_requested: bool,
    pub running: bool,
}

#[derive(Debug, Serialize)]
pub struct IndexStatusResponse {
    pub running: bool,
    pub resume_offset: u64,
    pub cancel_requested: bool,
    #[serde(flatten)]
    pub status: IndexStatus,
}

#[derive(Debug, Serialize)]
pub struct RequestsResponse {
    pub requests: Vec<MediaRequest>,
    pub total: usize,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map indexer errors onto HTTP statuses.
pub fn index_error_response(e: IndexError) -> ApiError {
    let status = match &e {
        IndexError::Validation(_) => StatusCode::BAD_REQUEST,
        IndexError::Authorization(_) => StatusCode::FORBIDDEN,
        IndexError::AlreadyRunning => StatusCode::CONFLICT,
        IndexError::Source(_) => StatusCode::BAD_GATEWAY,
        IndexError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error(status, e.to_string())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/admin/index
///
/// Start a run in the background. The category comes from the channel's
/// configuration.
pub async fn start_index(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(body): Json<StartIndexRequest>,
) -> Result<(StatusCode, Json<StartIndexResponse>), ApiError> {
    let Some(indexer) = state.indexer() else {
        return Err(error(
            StatusCode::SERVICE_UNAVAILABLE,
            "indexer not available: no message source configured",
        ));
    };

    let channel = ChannelRef(body.channel_id);
    let category = indexer.channels().category_of(channel).ok_or_else(|| {
        index_error_response(IndexError::Authorization(format!(
            "channel {} is not configured",
            channel
        )))
    })?;

    let permit = indexer
        .try_begin(IndexRequest {
            channel,
            category,
            upper_message_id: body.last_message_id,
        })
        .map_err(index_error_response)?;

    let resume_offset = state.session().resume_offset();
    info!(user = %user, channel = %channel, category = %category, "Index run requested");

    let notifier: Arc<dyn ProgressNotifier> = state.status().clone();
    indexer.spawn(permit, notifier);

    Ok((
        StatusCode::ACCEPTED,
        Json(StartIndexResponse {
            channel,
            category,
            upper_message_id: body.last_message_id,
            resume_offset,
        }),
    ))
}

/// POST /api/v1/admin/index/cancel
pub async fn cancel_index(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Json<CancelResponse> {
    state.session().request_cancel();
    let running = state.indexer().is_some_and(|i| i.is_running());
    info!(user = %user, running, "Index cancel requested");

    Json(CancelResponse {
        cancel_requested: true,
        running,
    })
}

/// PUT /api/v1/admin/index/offset
pub async fn set_offset(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetOffsetRequest>,
) -> Result<Json<OffsetResponse>, ApiError> {
    state
        .session()
        .set_resume_offset(body.offset)
        .map_err(index_error_response)?;

    Ok(Json(OffsetResponse {
        offset: state.session().resume_offset(),
    }))
}

/// GET /api/v1/admin/index/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<IndexStatusResponse> {
    let status = state.status().snapshot().await;
    let running = state.indexer().is_some_and(|i| i.is_running());

    Json(IndexStatusResponse {
        running,
        resume_offset: state.session().resume_offset(),
        cancel_requested: state.session().is_cancel_requested(),
        status,
    })
}

/// DELETE /api/v1/admin/catalog/{category}
///
/// Reset a category to an empty catalog. Refused while a run is active, since
/// the run would write its snapshot back over the cleared document.
pub async fn clear_catalog(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(category): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let category: Category = category
        .parse()
        .map_err(|e| error(StatusCode::NOT_FOUND, format!("{}", e)))?;

    match state.indexer() {
        Some(indexer) => indexer
            .clear_catalog(category)
            .map_err(index_error_response)?,
        None => state
            .catalog()
            .clear(category)
            .map_err(|e| index_error_response(e.into()))?,
    }

    info!(user = %user, category = %category, "Catalog cleared");
    Ok(Json(SuccessResponse {
        message: format!("{} catalog cleared", category),
    }))
}

/// GET /api/v1/admin/requests
///
/// Titles users searched for without a hit, oldest first.
pub async fn list_requests(State(state): State<Arc<AppState>>) -> Json<RequestsResponse> {
    let requests = state.catalog().load_requests();
    let total = requests.len();
    Json(RequestsResponse { requests, total })
}

/// DELETE /api/v1/admin/requests
pub async fn clear_requests(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .catalog()
        .clear_requests()
        .map_err(|e| index_error_response(e.into()))?;

    info!(user = %user, "Pending requests cleared");
    Ok(Json(SuccessResponse {
        message: "all requests cleared".to_string(),
    }))
}
