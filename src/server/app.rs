//! Inspection server implementation

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::scheduler::CascadeEngine;

use super::api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Decision engine
    pub engine: Arc<CascadeEngine>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: Arc<CascadeEngine>) -> Self {
        Self {
            engine,
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// Inspection Server
// ============================================================================

/// HTTP server exposing cascade decisions for debugging
pub struct InspectionServer {
    config: ServerConfig,
    state: AppState,
}

impl InspectionServer {
    /// Create a server around an engine
    pub fn new(config: ServerConfig, engine: Arc<CascadeEngine>) -> Self {
        Self {
            config,
            state: AppState::new(engine),
        }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Bind address
    pub fn bind_address(&self) -> Result<SocketAddr, ServerError> {
        self.config
            .bind_address
            .parse()
            .map_err(|e| ServerError::ConfigError(format!("{}: {e}", self.config.bind_address)))
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self.bind_address()?;
        let router = self.build_router();

        tracing::info!(
            address = %addr,
            calendar = self.state.engine.calendar().name(),
            "Starting inspection server"
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("Inspection server shutdown complete");
        Ok(())
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================
