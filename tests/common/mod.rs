//! Common test utilities

use cadence::calendar::StaticCalendar;
use cadence::config::SchedulingConfig;
use cadence::models::{Platform, RawPost, ScheduledPost};
use cadence::scheduler::{CascadeEngine, TimeContext};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use std::sync::Arc;

/// Default scheduling timezone
#[allow(dead_code)]
pub fn ctx() -> TimeContext {
    TimeContext::default()
}

/// Fixed "today" used across tests (a Monday)
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

/// 08:00 local on `today()`
pub fn now() -> DateTime<FixedOffset> {
    ctx().at(today(), NaiveTime::from_hms_opt(8, 0, 0).unwrap())
}

/// Local instant `offset` days after today at `HH:MM`
#[allow(dead_code)]
pub fn local(offset: i64, time: &str) -> DateTime<FixedOffset> {
    let date = today() + Duration::days(offset);
    ctx().at(date, NaiveTime::parse_from_str(time, "%H:%M").unwrap())
}

/// Raw calendar record `offset` days after today at `HH:MM`
#[allow(dead_code)]
pub fn raw_post(offset: i64, time: &str, networks: &[&str]) -> RawPost {
    let date = today() + Duration::days(offset);
    RawPost::new(format!("{date}T{time}:00"), networks)
}

/// Validated post `offset` days after today at `HH:MM`
#[allow(dead_code)]
pub fn post(offset: i64, time: &str, platform: Platform) -> ScheduledPost {
    ScheduledPost::new(local(offset, time), [platform])
}

/// Engine over an in-memory calendar with default settings
#[allow(dead_code)]
pub fn engine_with(posts: Vec<RawPost>) -> CascadeEngine {
    engine_with_config(posts, &SchedulingConfig::default())
}

/// Engine over an in-memory calendar with custom settings
#[allow(dead_code)]
pub fn engine_with_config(posts: Vec<RawPost>, config: &SchedulingConfig) -> CascadeEngine {
    let calendar = Arc::new(StaticCalendar::new(posts, ctx()));
    CascadeEngine::new(calendar, config).unwrap()
}

/// `per_day` topics on each of the given day offsets at the first fixed slots
#[allow(dead_code)]
pub fn fill_days(days: impl IntoIterator<Item = i64>, per_day: usize) -> Vec<RawPost> {
    const TIMES: [&str; 5] = ["09:00", "12:30", "15:15", "17:45", "20:00"];
    days.into_iter()
        .flat_map(|day| {
            TIMES
                .iter()
                .take(per_day)
                .map(move |time| raw_post(day, time, &["twitter", "instagram"]))
        })
        .collect()
}
