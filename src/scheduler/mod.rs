//! Cascading post scheduler
//!
//! Decides where the next topic lands: which day of the forward window,
//! at which time of day, and how its platforms are staggered.
//!
//! # Overview
//!
//! Days are filled breadth-first. Every day of the window reaches a level
//! before any day moves past it, and earlier weeks saturate before later
//! ones. Within a day, topics go to fixed preferred slots that no existing
//! topic sits close to; once those are exhausted a deterministic spacing
//! fallback applies.
//!
//! # Pipeline
//!
//! ```text
//!  CalendarAdapter ──► RawPost ──► ScheduledPost ──► TopicGrouper
//!                                   (malformed                │
//!                                    skipped)                 ▼
//!                                                     CascadeAnalyzer
//!                                                             │ target day/level
//!                                                             ▼
//!                       StaggerCalculator ◄── decision ◄── SlotPicker
//! ```
//!
//! # Modules
//!
//! - [`time`] - timezone context, timestamp parsing and formatting
//! - [`grouping`] - posts to topics with transitive chaining
//! - [`cascade`] - per-day counts and the breadth-first target
//! - [`slots`] - fixed slot schedule and conflict-aware picking
//! - [`stagger`] - per-platform publish offsets
//! - [`engine`] - orchestration, pattern view, fallback policy
//! - [`error`] - scheduler error types
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cadence::calendar::StaticCalendar;
//! use cadence::config::SchedulingConfig;
//! use cadence::scheduler::CascadeEngine;
//!
//! let config = SchedulingConfig::default();
//! let calendar = Arc::new(StaticCalendar::new(vec![], config.time_context()?));
//! let engine = CascadeEngine::new(calendar, &config)?;
//!
//! let decision = engine.next_action().await?;
//! println!("{}", decision.action);
//! ```

pub mod cascade;
pub mod engine;
pub mod error;
pub mod grouping;
pub mod slots;
pub mod stagger;
pub mod time;

pub use cascade::{CascadeAnalysis, CascadeAnalyzer, CascadeTarget, DayLoad};
pub use engine::{
    ActionReport, CascadeDecision, CascadeEngine, CascadePattern, ConflictAnalysis, PatternDay,
    PlannedPost, PostPlan, TopicDetail,
};
pub use error::{SchedulerError, SchedulerResult};
pub use grouping::TopicGrouper;
pub use slots::{RejectedSlot, SlotChoice, SlotPicker, SlotSchedule, SlotSource};
pub use stagger::{StaggerCalculator, StaggerPlan, StaggeredSlot};
pub use time::TimeContext;
