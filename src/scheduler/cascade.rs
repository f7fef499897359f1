//! Day cascade analysis
//!
//! Counts topics per day across a forward window and chooses the day the
//! next topic should land on. The fill order is breadth-first:
//!
//! - the window is split into consecutive 7-day weeks starting at day 0
//! - the fill level is the topic count of the fullest day
//! - the target is the first day, in (week, day) order, below that level
//! - when every day has reached it, a new pass starts at day 0 one level up
//!
//! So every day of week N reaches level L before any day of week N+1 does,
//! and a week is saturated at L before any of its days moves to L+1.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::models::Topic;

use super::error::{SchedulerError, SchedulerResult};

/// Days per cascade week
pub const DAYS_PER_WEEK: usize = 7;

/// Default cascade window in days
pub const DEFAULT_WINDOW_DAYS: usize = 7;

/// Topic count for one day of the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayLoad {
    /// 0-based offset from today
    pub offset: usize,
    /// 0-based week index
    pub week: usize,
    pub date: NaiveDate,
    pub topic_count: usize,
}

/// Where the next topic goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeTarget {
    /// 0-based offset from today
    pub day: usize,
    pub date: NaiveDate,
    /// Topics already on the target day
    pub current_topics: usize,
    /// Level the day reaches with the new topic
    pub new_level: usize,
    /// Level the current pass is filling towards
    pub fill_level: usize,
    /// Whether the new topic raises the window maximum
    pub is_level_increase: bool,
}

/// Result of a cascade analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeAnalysis {
    pub days: Vec<DayLoad>,
    /// Minimum topic count per week, in week order
    pub week_minimums: Vec<usize>,
    /// Topic count of the fullest day
    pub max_level: usize,
    pub target: CascadeTarget,
}

/// Breadth-first cascade analyzer over a fixed window
#[derive(Debug, Clone, Copy)]
pub struct CascadeAnalyzer {
    window_days: usize,
}

impl CascadeAnalyzer {
    /// Create an analyzer; the window must cover at least one full week
    pub fn new(window_days: usize) -> SchedulerResult<Self> {
        if window_days < DAYS_PER_WEEK {
            return Err(SchedulerError::invalid_window(window_days, DAYS_PER_WEEK));
        }
        Ok(Self { window_days })
    }

    /// Window length in days
    pub fn window_days(&self) -> usize {
        self.window_days
    }

    /// Count topics per day of the window starting at `today`
    ///
    /// Topics outside the window are ignored.
    pub fn day_counts(&self, today: NaiveDate, topics: &[Topic]) -> Vec<usize> {
        let mut counts = vec![0usize; self.window_days];
        for topic in topics {
            let offset = (topic.date - today).num_days();
            if (0..self.window_days as i64).contains(&offset) {
                counts[offset as usize] += 1;
            }
        }
        counts
    }

    /// Analyze topics for the window starting at `today`
    pub fn analyze(&self, today: NaiveDate, topics: &[Topic]) -> CascadeAnalysis {
        let counts = self.day_counts(today, topics);
        analyze_counts(today, &counts)
    }
}

/// Pick the target day and fill level for per-day counts
///
/// Returns `(day, fill_level)`. An empty slice targets day 0 at level 1.
pub fn next_target(counts: &[usize]) -> (usize, usize) {
    let max_level = counts.iter().copied().max().unwrap_or(0);

    // Week-major then day-minor order coincides with plain offset order
    let deficient = counts
        .chunks(DAYS_PER_WEEK)
        .enumerate()
        .find_map(|(week, days)| {
            days.iter()
                .position(|&count| count < max_level)
                .map(|day| week * DAYS_PER_WEEK + day)
        });

    match deficient {
        Some(day) => (day, max_level),
        None => (0, max_level + 1),
    }
}

/// Minimum count of each 7-day week
pub fn week_minimums(counts: &[usize]) -> Vec<usize> {
    counts
        .chunks(DAYS_PER_WEEK)
        .map(|week| week.iter().copied().min().unwrap_or(0))
        .collect()
}

/// Analyze raw per-day counts for a window starting at `today`
pub fn analyze_counts(today: NaiveDate, counts: &[usize]) -> CascadeAnalysis {
    let max_level = counts.iter().copied().max().unwrap_or(0);
    let (day, fill_level) = next_target(counts);
    let current_topics = counts.get(day).copied().unwrap_or(0);
    let new_level = current_topics + 1;

    let days = counts
        .iter()
        .enumerate()
        .map(|(offset, &topic_count)| DayLoad {
            offset,
            week: offset / DAYS_PER_WEEK,
            date: today + Duration::days(offset as i64),
            topic_count,
        })
        .collect();

    tracing::debug!(
        max_level,
        target_day = day,
        fill_level,
        new_level,
        "Cascade analysis complete"
    );

    CascadeAnalysis {
        days,
        week_minimums: week_minimums(counts),
        max_level,
        target: CascadeTarget {
            day,
            date: today + Duration::days(day as i64),
            current_topics,
            new_level,
            fill_level,
            is_level_increase: new_level > max_level,
        },
    }
}
