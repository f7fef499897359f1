pub mod schedule;
pub mod serve;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use cadence::calendar::client::HttpCalendarConfig;
use cadence::calendar::{CalendarAdapter, HttpCalendar, StaticCalendar};
use cadence::config::Config;
use cadence::scheduler::CascadeEngine;

// Re-export command functions for convenience
pub use schedule::{check, next, pattern, plan, stagger};
pub use serve::serve;

/// Pick the calendar source: an explicit snapshot wins over the API
pub fn build_calendar(
    config: &Config,
    calendar_file: Option<&Path>,
) -> Result<Arc<dyn CalendarAdapter>> {
    let ctx = config.scheduling.time_context()?;
    let snapshot = calendar_file.or(config.calendar.snapshot_file.as_deref());

    match snapshot {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Using calendar snapshot");
            let calendar = StaticCalendar::from_json_file(path, ctx)
                .with_context(|| format!("Failed to load calendar snapshot {}", path.display()))?;
            Ok(Arc::new(calendar))
        }
        None => {
            tracing::debug!(url = %config.calendar.base_url, "Using scheduling API");
            let calendar = HttpCalendar::new(HttpCalendarConfig::from(&config.calendar))
                .context("Failed to create calendar client")?;
            Ok(Arc::new(calendar))
        }
    }
}

/// Build the decision engine for a command
pub fn build_engine(config: &Config, calendar_file: Option<&Path>) -> Result<CascadeEngine> {
    let calendar = build_calendar(config, calendar_file)?;
    CascadeEngine::new(calendar, &config.scheduling).context("Invalid scheduling configuration")
}
