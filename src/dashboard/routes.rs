//! HTTP route handlers.
//!
//! Every plan request runs its own planner invocation. The shared state
//! only holds the immutable defaults loaded at startup.
//!
//! Plans run inline on the runtime worker. Validation caps a request at
//! 1,000 iterations of at most 10 steps before any simulation starts.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::hedge::{HedgeReport, HedgeRequest};
use crate::report::export::export_csv;
use crate::types::StaggerError;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Read-only state accessible by all route handlers.
pub struct ServerState {
    pub defaults: AppConfig,
}

impl ServerState {
    pub fn new(defaults: AppConfig) -> Self {
        Self { defaults }
    }
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handler failure mapped onto an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    /// Request parameters failed validation.
    Invalid(StaggerError),
    Internal(anyhow::Error),
}

impl From<StaggerError> for ApiError {
    fn from(e: StaggerError) -> Self {
        ApiError::Invalid(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Invalid(e) => {
                warn!(error = %e, "Rejected plan request");
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Internal(e) => {
                warn!(error = %e, "Plan request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/defaults
pub async fn get_defaults(State(state): State<AppState>) -> Json<HedgeRequest> {
    Json(HedgeRequest::from(&state.defaults))
}

/// POST /api/plan
pub async fn post_plan(Json(request): Json<HedgeRequest>) -> Result<Json<HedgeReport>, ApiError> {
    let report = request.run()?;
    info!(
        capital = report.plan.final_capital,
        verdict = ?report.plan.verdict,
        "Plan served"
    );
    Ok(Json(report))
}

/// POST /api/plan/export
pub async fn post_export(Json(request): Json<HedgeRequest>) -> Result<Response, ApiError> {
    let report = request.run()?;
    let bytes = export_csv(&report).map_err(ApiError::Internal)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"staggered_plan.csv\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
