//! Inspection HTTP API
//!
//! Exposes the cascade engine's read-only views for debugging and for
//! callers that prefer HTTP over linking the crate.
//!
//! ```text
//!   GET  /api/health          liveness and calendar reachability
//!   GET  /api/cascade/next    next action (fallback policy applied)
//!   GET  /api/cascade/pattern day-by-day cascade view
//!   POST /api/cascade/plan    next action with staggered platform times
//! ```

pub mod api;
pub mod app;

pub use api::{create_router, ApiResponse};
pub use app::{AppState, InspectionServer, ServerError};
