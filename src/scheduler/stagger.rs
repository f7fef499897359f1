//! Per-platform publish time staggering
//!
//! Fanning a topic out to several platforms at the exact same instant trips
//! the downstream scheduling API's rate and display behaviour. Platform `i`
//! in the given order is therefore published at `base + i * increment`.

use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;

use crate::models::Platform;

use super::error::{SchedulerError, SchedulerResult};

/// Default stagger increment in minutes
pub const DEFAULT_STAGGER_MINUTES: i64 = 10;

/// Largest accepted stagger increment in minutes
pub const MAX_STAGGER_MINUTES: i64 = 60;

/// One platform's publish time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaggeredSlot {
    pub platform: Platform,
    pub publish_at: DateTime<FixedOffset>,
    pub offset_minutes: i64,
}

/// Publish times for every platform of a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaggerPlan {
    pub base: DateTime<FixedOffset>,
    pub entries: Vec<StaggeredSlot>,
}

impl StaggerPlan {
    /// Publish time for a platform
    pub fn get(&self, platform: Platform) -> Option<DateTime<FixedOffset>> {
        self.entries
            .iter()
            .find(|e| e.platform == platform)
            .map(|e| e.publish_at)
    }

    /// Number of platforms
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no platform was given
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last publish time in the plan
    pub fn last(&self) -> Option<DateTime<FixedOffset>> {
        self.entries.last().map(|e| e.publish_at)
    }
}

/// Assigns increasing offsets to platforms
#[derive(Debug, Clone, Copy)]
pub struct StaggerCalculator {
    increment: Duration,
}

impl StaggerCalculator {
    /// Create a calculator; increment must be within 1..=60 minutes
    pub fn new(increment: Duration) -> SchedulerResult<Self> {
        if increment < Duration::minutes(1) || increment > Duration::minutes(MAX_STAGGER_MINUTES) {
            return Err(SchedulerError::invalid_duration(
                "stagger_minutes",
                format!("must be between 1 and {MAX_STAGGER_MINUTES} minutes"),
            ));
        }
        Ok(Self { increment })
    }

    /// Create a calculator from minutes
    pub fn from_minutes(minutes: i64) -> SchedulerResult<Self> {
        Self::new(Duration::minutes(minutes))
    }

    /// Increment between consecutive platforms
    pub fn increment(&self) -> Duration {
        self.increment
    }

    /// Stagger platforms in the given order
    ///
    /// Repeated platforms keep their first position only.
    pub fn stagger(&self, base: DateTime<FixedOffset>, platforms: &[Platform]) -> StaggerPlan {
        let mut entries: Vec<StaggeredSlot> = Vec::with_capacity(platforms.len());

        for platform in platforms {
            if entries.iter().any(|e| e.platform == *platform) {
                continue;
            }
            let offset = self.increment * entries.len() as i32;
            entries.push(StaggeredSlot {
                platform: *platform,
                publish_at: base + offset,
                offset_minutes: offset.num_minutes(),
            });
        }

        StaggerPlan { base, entries }
    }
}

impl Default for StaggerCalculator {
    fn default() -> Self {
        Self {
            increment: Duration::minutes(DEFAULT_STAGGER_MINUTES),
        }
    }
}
