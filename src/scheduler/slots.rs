//! Daily time slots and conflict-aware slot picking
//!
//! A day has a fixed, ordered list of preferred posting times. The picker
//! walks them in order and returns the first one with no existing topic
//! within the grouping window. When every fixed slot is taken it steps
//! forward from the latest topic, then backward from the earliest one, by
//! a fixed spacing. If neither lands on a free instant of the same day, the
//! gaps between topics are scanned at minute resolution.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use serde::Serialize;

use super::error::{SchedulerError, SchedulerResult};
use super::time::TimeContext;

/// Default daily posting times
pub const DEFAULT_TIME_SLOTS: &[&str] = &["09:00", "12:30", "15:15", "17:45", "19:30"];

/// Default spacing between fallback candidates in minutes
pub const DEFAULT_FALLBACK_SPACING_MINUTES: i64 = 150;

// ============================================================================
// Slot Schedule
// ============================================================================

/// Ordered list of preferred daily posting times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSchedule {
    slots: Vec<NaiveTime>,
}

impl SlotSchedule {
    /// Create a schedule; slots must be non-empty and strictly increasing
    pub fn new(slots: Vec<NaiveTime>) -> SchedulerResult<Self> {
        if slots.is_empty() {
            return Err(SchedulerError::EmptySlotSchedule);
        }

        for pair in slots.windows(2) {
            if pair[1] <= pair[0] {
                return Err(SchedulerError::UnorderedSlots {
                    previous: pair[0].format("%H:%M").to_string(),
                    next: pair[1].format("%H:%M").to_string(),
                });
            }
        }

        Ok(Self { slots })
    }

    /// Parse `HH:MM` strings
    pub fn parse<S: AsRef<str>>(values: &[S]) -> SchedulerResult<Self> {
        let slots = values
            .iter()
            .map(|v| {
                let v = v.as_ref().trim();
                NaiveTime::parse_from_str(v, "%H:%M")
                    .map_err(|_| SchedulerError::invalid_slot_time(v))
            })
            .collect::<SchedulerResult<Vec<_>>>()?;
        Self::new(slots)
    }

    /// Slot times in order
    pub fn slots(&self) -> &[NaiveTime] {
        &self.slots
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false for a constructed schedule
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots formatted as `HH:MM`
    pub fn labels(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect()
    }
}

impl Default for SlotSchedule {
    fn default() -> Self {
        let slots = [(9, 0), (12, 30), (15, 15), (17, 45), (19, 30)]
            .iter()
            .filter_map(|&(h, m)| NaiveTime::from_hms_opt(h, m, 0))
            .collect();
        Self { slots }
    }
}

// ============================================================================
// Slot Choice
// ============================================================================

/// How the chosen slot was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SlotSource {
    /// A fixed slot, by index in the schedule
    Fixed { index: usize },
    /// Fallback stepping forward from the latest topic
    Fallback { steps: u32 },
    /// Fallback stepping backward from the earliest topic
    Backfill { steps: u32 },
    /// First free minute found between topics
    Scan,
}

/// A candidate rejected because of a nearby topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedSlot {
    /// Candidate local time (`HH:MM`)
    pub slot: String,
    /// Existing topic time that blocks it (`HH:MM`)
    pub conflicts_with: String,
    /// Distance between the two in minutes
    pub gap_minutes: i64,
}

/// Picker output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotChoice {
    pub time: DateTime<FixedOffset>,
    pub source: SlotSource,
    pub rejected: Vec<RejectedSlot>,
    pub reason: String,
}

impl SlotChoice {
    /// Whether the fallback policy produced this slot
    pub fn used_fallback(&self) -> bool {
        !matches!(self.source, SlotSource::Fixed { .. })
    }
}

// ============================================================================
// Slot Picker
// ============================================================================

/// Conflict-aware slot picker
#[derive(Debug, Clone)]
pub struct SlotPicker {
    schedule: SlotSchedule,
    window: Duration,
    spacing: Duration,
}

impl SlotPicker {
    /// Create a picker; the window must be positive and the spacing must
    /// exceed it, otherwise a stepped candidate always collides with its anchor
    pub fn new(schedule: SlotSchedule, window: Duration, spacing: Duration) -> SchedulerResult<Self> {
        if window <= Duration::zero() {
            return Err(SchedulerError::invalid_duration(
                "grouping_window",
                "must be positive",
            ));
        }
        if spacing <= window {
            return Err(SchedulerError::invalid_duration(
                "fallback_spacing",
                "must exceed the grouping window",
            ));
        }
        Ok(Self {
            schedule,
            window,
            spacing,
        })
    }

    /// Fixed schedule
    pub fn schedule(&self) -> &SlotSchedule {
        &self.schedule
    }

    /// Pick a slot on `date` given topic times already used
    ///
    /// Occupied times on other days are ignored.
    pub fn pick(
        &self,
        ctx: &TimeContext,
        date: NaiveDate,
        occupied: &[DateTime<FixedOffset>],
    ) -> SchedulerResult<SlotChoice> {
        let mut same_day: Vec<DateTime<FixedOffset>> = occupied
            .iter()
            .copied()
            .filter(|t| ctx.local_date(*t) == date)
            .collect();
        same_day.sort();

        let mut rejected = Vec::new();

        for (index, slot) in self.schedule.slots().iter().enumerate() {
            let candidate = ctx.at(date, *slot);
            match self.conflict(candidate, &same_day) {
                Some(blocker) => rejected.push(self.rejection(ctx, candidate, blocker)),
                None => {
                    let reason = format!(
                        "{} is the first fixed slot with no topic within {} minutes",
                        ctx.format_clock(candidate),
                        self.window.num_minutes()
                    );
                    return Ok(SlotChoice {
                        time: candidate,
                        source: SlotSource::Fixed { index },
                        rejected,
                        reason,
                    });
                }
            }
        }

        // Every fixed slot is blocked, so at least one topic exists that day
        let (Some(earliest), Some(latest)) = (same_day.first().copied(), same_day.last().copied())
        else {
            return Err(SchedulerError::no_free_slot(date.to_string()));
        };

        if let Some((time, steps)) = self.step(ctx, date, latest, self.spacing, &same_day, &mut rejected) {
            let reason = format!(
                "all {} fixed slots taken; {} is {} minutes after the latest topic at {}",
                self.schedule.len(),
                ctx.format_clock(time),
                (time - latest).num_minutes(),
                ctx.format_clock(latest)
            );
            return Ok(SlotChoice {
                time,
                source: SlotSource::Fallback { steps },
                rejected,
                reason,
            });
        }

        if let Some((time, steps)) = self.step(ctx, date, earliest, -self.spacing, &same_day, &mut rejected) {
            let reason = format!(
                "all {} fixed slots taken and no room after {}; {} is {} minutes before the earliest topic at {}",
                self.schedule.len(),
                ctx.format_clock(latest),
                ctx.format_clock(time),
                (earliest - time).num_minutes(),
                ctx.format_clock(earliest)
            );
            return Ok(SlotChoice {
                time,
                source: SlotSource::Backfill { steps },
                rejected,
                reason,
            });
        }

        if let Some(time) = self.scan(ctx, date, &same_day) {
            let reason = format!(
                "no stepped candidate fits; {} is the first minute clear of every topic by more than {} minutes",
                ctx.format_clock(time),
                self.window.num_minutes()
            );
            return Ok(SlotChoice {
                time,
                source: SlotSource::Scan,
                rejected,
                reason,
            });
        }

        tracing::warn!(date = %date, topics = same_day.len(), "No free slot left on day");
        Err(SchedulerError::no_free_slot(date.to_string()))
    }

    /// Step from `anchor` by `delta` while on `date`; returns the first
    /// free candidate and the number of steps taken
    fn step(
        &self,
        ctx: &TimeContext,
        date: NaiveDate,
        anchor: DateTime<FixedOffset>,
        delta: Duration,
        occupied: &[DateTime<FixedOffset>],
        rejected: &mut Vec<RejectedSlot>,
    ) -> Option<(DateTime<FixedOffset>, u32)> {
        let mut candidate = anchor + delta;
        let mut steps = 1u32;
        while ctx.local_date(candidate) == date {
            match self.conflict(candidate, occupied) {
                Some(blocker) => {
                    rejected.push(self.rejection(ctx, candidate, blocker));
                    candidate += delta;
                    steps += 1;
                }
                None => return Some((candidate, steps)),
            }
        }
        None
    }

    /// Earliest free minute of the day
    ///
    /// A free stretch starts either at midnight or one minute past the
    /// window after some topic, so those are the only candidates.
    fn scan(
        &self,
        ctx: &TimeContext,
        date: NaiveDate,
        occupied: &[DateTime<FixedOffset>],
    ) -> Option<DateTime<FixedOffset>> {
        let clearance = self.window + Duration::minutes(1);
        let mut candidates: Vec<DateTime<FixedOffset>> = std::iter::once(ctx.start_of_day(date))
            .chain(occupied.iter().map(|t| *t + clearance))
            .filter(|t| ctx.local_date(*t) == date)
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .find(|t| self.conflict(*t, occupied).is_none())
    }

    fn conflict(
        &self,
        candidate: DateTime<FixedOffset>,
        occupied: &[DateTime<FixedOffset>],
    ) -> Option<DateTime<FixedOffset>> {
        occupied
            .iter()
            .copied()
            .filter(|t| distance(*t, candidate) <= self.window)
            .min_by_key(|t| distance(*t, candidate))
    }

    fn rejection(
        &self,
        ctx: &TimeContext,
        candidate: DateTime<FixedOffset>,
        blocker: DateTime<FixedOffset>,
    ) -> RejectedSlot {
        RejectedSlot {
            slot: ctx.format_clock(candidate),
            conflicts_with: ctx.format_clock(blocker),
            gap_minutes: distance(blocker, candidate).num_minutes(),
        }
    }
}

fn distance(a: DateTime<FixedOffset>, b: DateTime<FixedOffset>) -> Duration {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TimeContext {
        TimeContext::from_name("America/New_York").unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        ctx().at(date(), NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    fn picker() -> SlotPicker {
        SlotPicker::new(
            SlotSchedule::default(),
            Duration::minutes(120),
            Duration::minutes(DEFAULT_FALLBACK_SPACING_MINUTES),
        )
        .unwrap()
    }

    #[test]
    fn test_default_schedule_matches_constants() {
        let parsed = SlotSchedule::parse(DEFAULT_TIME_SLOTS).unwrap();
        assert_eq!(parsed, SlotSchedule::default());
        assert_eq!(parsed.labels(), vec!["09:00", "12:30", "15:15", "17:45", "19:30"]);
    }

    #[test]
    fn test_schedule_validation() {
        assert_eq!(
            SlotSchedule::new(vec![]).unwrap_err(),
            SchedulerError::EmptySlotSchedule
        );
        assert!(SlotSchedule::parse(&["12:30", "09:00"]).is_err());
        assert!(SlotSchedule::parse(&["09:00", "09:00"]).is_err());
        assert!(SlotSchedule::parse(&["9am"]).is_err());
    }

    #[test]
    fn test_picker_rejects_invalid_durations() {
        assert!(SlotPicker::new(SlotSchedule::default(), Duration::zero(), Duration::hours(2)).is_err());
        assert!(SlotPicker::new(SlotSchedule::default(), Duration::hours(2), Duration::zero()).is_err());
        // spacing equal to the window would collide with its own anchor
        assert!(SlotPicker::new(SlotSchedule::default(), Duration::hours(2), Duration::hours(2)).is_err());
        assert!(SlotPicker::new(SlotSchedule::default(), Duration::hours(2), Duration::minutes(121)).is_ok());
    }

    #[test]
    fn test_empty_day_gets_first_slot() {
        let choice = picker().pick(&ctx(), date(), &[]).unwrap();
        assert_eq!(choice.time, at(9, 0));
        assert_eq!(choice.source, SlotSource::Fixed { index: 0 });
        assert!(choice.rejected.is_empty());
    }

    #[test]
    fn test_skips_taken_slots_in_order() {
        let choice = picker().pick(&ctx(), date(), &[at(9, 0), at(12, 30)]).unwrap();
        assert_eq!(choice.time, at(15, 15));
        assert_eq!(choice.rejected.len(), 2);
        assert_eq!(choice.rejected[0].slot, "09:00");
        assert_eq!(choice.rejected[1].conflicts_with, "12:30");
        assert!(choice.reason.contains("15:15"));
    }

    #[test]
    fn test_near_topic_blocks_slot() {
        // 10:45 sits 105 minutes after 09:00 and 105 minutes before 12:30
        let choice = picker().pick(&ctx(), date(), &[at(10, 45)]).unwrap();
        assert_eq!(choice.time, at(15, 15));
        assert_eq!(choice.rejected[0].gap_minutes, 105);
    }

    #[test]
    fn test_topic_exactly_one_window_away_blocks_slot() {
        let choice = picker().pick(&ctx(), date(), &[at(7, 0)]).unwrap();
        assert_eq!(choice.time, at(12, 30));
        assert_eq!(choice.rejected.len(), 1);
        assert_eq!(choice.rejected[0].slot, "09:00");
        assert_eq!(choice.rejected[0].conflicts_with, "07:00");
        assert_eq!(choice.rejected[0].gap_minutes, 120);
    }

    #[test]
    fn test_other_days_are_ignored() {
        let yesterday = ctx().at(
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        );
        let choice = picker().pick(&ctx(), date(), &[yesterday]).unwrap();
        assert_eq!(choice.time, at(9, 0));
    }

    #[test]
    fn test_fallback_after_latest_topic() {
        let occupied = [at(9, 0), at(12, 30), at(15, 15), at(17, 45)];
        // 19:30 is 105 minutes after 17:45 and therefore taken
        let choice = picker().pick(&ctx(), date(), &occupied).unwrap();
        assert_eq!(choice.time, at(20, 15));
        assert!(choice.used_fallback());
        assert_eq!(choice.source, SlotSource::Fallback { steps: 1 });
        assert_eq!(choice.rejected.len(), 5);
    }

    #[test]
    fn test_backfill_before_earliest_topic() {
        // 22:30 + 150 minutes crosses midnight, so the search turns back
        let occupied = [at(9, 0), at(12, 30), at(15, 15), at(17, 45), at(22, 30)];
        let choice = picker().pick(&ctx(), date(), &occupied).unwrap();
        assert_eq!(choice.time, at(6, 30));
        assert_eq!(choice.source, SlotSource::Backfill { steps: 1 });
        assert!(choice.used_fallback());
        assert!(choice.reason.contains("before the earliest topic at 09:00"));
    }

    #[test]
    fn test_scan_finds_gap_between_topics() {
        let picker = SlotPicker::new(
            SlotSchedule::parse(&["12:00"]).unwrap(),
            Duration::minutes(120),
            Duration::minutes(DEFAULT_FALLBACK_SPACING_MINUTES),
        )
        .unwrap();
        let occupied = [at(1, 0), at(12, 0), at(23, 0)];

        let choice = picker.pick(&ctx(), date(), &occupied).unwrap();
        assert_eq!(choice.time, at(3, 1));
        assert_eq!(choice.source, SlotSource::Scan);
        assert_eq!(choice.rejected.len(), 1);
    }

    #[test]
    fn test_no_free_slot_when_day_is_covered() {
        let occupied = [at(2, 0), at(6, 0), at(10, 0), at(14, 0), at(18, 0), at(22, 0)];
        let err = picker().pick(&ctx(), date(), &occupied).unwrap_err();
        assert_eq!(err, SchedulerError::no_free_slot("2024-01-15"));
    }
}
