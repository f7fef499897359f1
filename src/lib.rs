//! cadence - cascading social media post scheduler
//!
//! Given the posts already scheduled on a calendar, decides on which day
//! and at what time the next topic should be published, fills days
//! breadth-first across weeks, avoids time-slot collisions, and staggers
//! per-platform publish times.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Platforms, raw calendar records, posts and topics
//! - [`calendar`] - Calendar adapters (static snapshot, HTTP API)
//! - [`scheduler`] - Grouping, cascade analysis, slot picking, staggering
//! - [`server`] - Inspection HTTP API
//! - [`error`] - Unified error type
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cadence::calendar::StaticCalendar;
//! use cadence::config::Config;
//! use cadence::scheduler::CascadeEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let ctx = config.scheduling.time_context()?;
//!     let calendar = Arc::new(StaticCalendar::from_json_file("posts.json", ctx)?);
//!     let engine = CascadeEngine::new(calendar, &config.scheduling)?;
//!     let report = engine.recommend().await?;
//!     println!("{}", report.decision.action);
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod server;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::calendar::{CalendarAdapter, CalendarError, HttpCalendar, StaticCalendar};
    pub use crate::config::Config;
    pub use crate::error::{CadenceErrorTrait, Error, ErrorCategory, Result};
    pub use crate::models::{Platform, RawPost, ScheduledPost, Topic};
    pub use crate::scheduler::{CascadeDecision, CascadeEngine, CascadePattern, TimeContext};
}

// Direct re-exports for convenience
pub use models::{Platform, RawPost, ScheduledPost, Topic};
pub use scheduler::{CascadeDecision, CascadeEngine};
