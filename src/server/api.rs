//! REST API handlers for the inspection server
//!
//! Read-only views over the cascade engine. Every response uses the
//! [`ApiResponse`] envelope.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{CadenceErrorTrait, Error, ErrorCategory};
use crate::models::Platform;
use crate::scheduler::{ActionReport, PostPlan};

use super::app::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub calendar: String,
    pub calendar_reachable: bool,
    pub timezone: String,
}

/// Plan request body
#[derive(Debug, Default, Deserialize)]
pub struct PlanRequest {
    /// Platforms in fan-out order; empty uses the configured default
    #[serde(default)]
    pub platforms: Vec<String>,
}

/// Plan response
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub report: ActionReport,
    pub plan: PostPlan,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/cascade/next", get(next_action))
        .route("/api/cascade/pattern", get(cascade_pattern))
        .route("/api/cascade/plan", post(plan_post))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let calendar = state.engine.calendar();
    let reachable = calendar.test_connection().await.is_ok();

    Json(ApiResponse::success(HealthResponse {
        status: if reachable { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        calendar: calendar.name().to_string(),
        calendar_reachable: reachable,
        timezone: state.engine.time_context().timezone().name().to_string(),
    }))
}

/// Next action with fallback applied
async fn next_action(State(state): State<AppState>) -> Response {
    match state.engine.recommend().await {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::success(report))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Day-by-day cascade pattern
async fn cascade_pattern(State(state): State<AppState>) -> Response {
    match state.engine.visualize_cascade_pattern().await {
        Ok(pattern) => (StatusCode::OK, Json(ApiResponse::success(pattern))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Next action plus staggered per-platform times
async fn plan_post(State(state): State<AppState>, Json(request): Json<PlanRequest>) -> Response {
    let platforms = match request
        .platforms
        .iter()
        .map(|p| p.parse::<Platform>())
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(platforms) => platforms,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::error(message)))
                .into_response();
        }
    };

    match state.engine.recommend().await {
        Ok(report) => {
            let plan = state.engine.plan_post(&report.decision, &platforms);
            (
                StatusCode::OK,
                Json(ApiResponse::success(PlanResponse { report, plan })),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

fn error_response(err: &Error) -> Response {
    let status = match err.category() {
        ErrorCategory::Network | ErrorCategory::Parsing | ErrorCategory::Storage => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!(error = %err, status = status.as_u16(), "Request failed");
    (status, Json(ApiResponse::<()>::error(err.to_string()))).into_response()
}
