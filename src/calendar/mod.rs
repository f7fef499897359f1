//! Calendar adapters
//!
//! The scheduler reads already-scheduled posts through the
//! [`CalendarAdapter`] trait. Two adapters ship with the crate:
//!
//! - [`StaticCalendar`] - an in-memory snapshot, optionally loaded from a
//!   JSON file; used for offline runs and tests
//! - [`HttpCalendar`] - the scheduling API over HTTP
//!
//! Adapters return raw records untouched. Validation and the
//! skip-malformed-posts policy belong to the engine.

pub mod client;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::RawPost;
use crate::scheduler::time::TimeContext;

pub use client::{HttpCalendar, HttpCalendarConfig};

/// Result type for calendar operations
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Errors raised by calendar adapters
#[derive(Error, Debug)]
pub enum CalendarError {
    /// Connectivity check failed
    #[error("Calendar unavailable: {0}")]
    Unavailable(String),

    /// Transport failure (connect, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Payload could not be decoded
    #[error("Invalid calendar payload: {0}")]
    Decode(String),

    /// Snapshot file could not be read
    #[error("Snapshot error for {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },

    /// Adapter misconfiguration
    #[error("Invalid calendar configuration: {0}")]
    InvalidConfig(String),
}

impl CalendarError {
    /// Whether a caller may fall back to a data-free decision
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }

    /// Whether a retry could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Source of already-scheduled posts
#[async_trait]
pub trait CalendarAdapter: Send + Sync {
    /// Adapter name for logs
    fn name(&self) -> &str;

    /// Fail fast if the calendar source is unreachable
    async fn test_connection(&self) -> CalendarResult<()>;

    /// Posts scheduled between `start` and `end`, both inclusive
    async fn get_scheduled_posts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CalendarResult<Vec<RawPost>>;
}

/// Accepted JSON layouts for post lists
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PostsEnvelope {
    List(Vec<serde_json::Value>),
    Posts { posts: Vec<serde_json::Value> },
    Data { data: Vec<serde_json::Value> },
}

impl PostsEnvelope {
    /// Decode records one by one; undecodable records are dropped
    pub(crate) fn into_posts(self) -> Vec<RawPost> {
        let values = match self {
            Self::List(v) | Self::Posts { posts: v } | Self::Data { data: v } => v,
        };

        values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<RawPost>(value) {
                Ok(post) => Some(post),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Dropping undecodable calendar record");
                    None
                }
            })
            .collect()
    }
}

// ============================================================================
// Static Calendar
// ============================================================================

/// In-memory calendar snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticCalendar {
    posts: Vec<RawPost>,
    ctx: TimeContext,
    offline: bool,
}

impl StaticCalendar {
    /// Create a snapshot from raw posts
    pub fn new(posts: Vec<RawPost>, ctx: TimeContext) -> Self {
        Self {
            posts,
            ctx,
            offline: false,
        }
    }

    /// Load a snapshot from a JSON file
    ///
    /// The file holds an array of posts or `{"posts": [...]}`.
    pub fn from_json_file(path: impl AsRef<Path>, ctx: TimeContext) -> CalendarResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CalendarError::Snapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&content, ctx).map_err(|e| CalendarError::Snapshot {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse a snapshot from JSON text
    pub fn from_json_str(json: &str, ctx: TimeContext) -> CalendarResult<Self> {
        let envelope: PostsEnvelope =
            serde_json::from_str(json).map_err(|e| CalendarError::Decode(e.to_string()))?;
        Ok(Self::new(envelope.into_posts(), ctx))
    }

    /// Simulate an unreachable upstream
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// All posts in the snapshot
    pub fn posts(&self) -> &[RawPost] {
        &self.posts
    }

    fn in_range(&self, post: &RawPost, start: NaiveDate, end: NaiveDate) -> bool {
        let Some(raw) = post.date_time() else {
            return true;
        };
        let zone = post
            .publication_date
            .as_ref()
            .and_then(|d| d.timezone.as_deref());

        match self.ctx.parse(raw, zone) {
            Ok(instant) => {
                let date = self.ctx.local_date(instant);
                date >= start && date <= end
            }
            // Unreadable dates pass through so the engine can count them
            Err(_) => true,
        }
    }
}

#[async_trait]
impl CalendarAdapter for StaticCalendar {
    fn name(&self) -> &str {
        "static"
    }

    async fn test_connection(&self) -> CalendarResult<()> {
        if self.offline {
            return Err(CalendarError::Unavailable(
                "static calendar marked offline".to_string(),
            ));
        }
        Ok(())
    }

    async fn get_scheduled_posts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CalendarResult<Vec<RawPost>> {
        if self.offline {
            return Err(CalendarError::Unavailable(
                "static calendar marked offline".to_string(),
            ));
        }

        Ok(self
            .posts
            .iter()
            .filter(|p| self.in_range(p, start, end))
            .cloned()
            .collect())
    }
}
