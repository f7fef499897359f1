//! Configuration management for the cascade scheduler
//!
//! Configuration comes from a TOML file, environment variables
//! (`CADENCE_*`) overlaying it, and command-line flags applied by the
//! binary. Scheduling values are turned into explicit [`TimeContext`] and
//! [`SlotSchedule`] instances handed to the engine at construction.

use anyhow::{Context, Result};
use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::Platform;
use crate::scheduler::cascade::{DEFAULT_WINDOW_DAYS, DAYS_PER_WEEK};
use crate::scheduler::error::SchedulerResult;
use crate::scheduler::slots::{SlotSchedule, DEFAULT_TIME_SLOTS};
use crate::scheduler::stagger::MAX_STAGGER_MINUTES;
use crate::scheduler::time::{TimeContext, DEFAULT_TIMEZONE};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheduling policy
    pub scheduling: SchedulingConfig,

    /// Calendar source
    pub calendar: CalendarConfig,

    /// Inspection HTTP server
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Scheduling policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// IANA timezone name
    pub timezone: String,

    /// Preferred daily posting times (`HH:MM`, strictly increasing)
    pub time_slots: Vec<String>,

    /// Posts closer than this belong to the same topic
    pub grouping_window_minutes: u32,

    /// Step used once all fixed slots are taken
    pub fallback_spacing_minutes: u32,

    /// Forward-looking cascade window
    pub cascade_window_days: usize,

    /// Days shown by the pattern view
    pub display_days: usize,

    /// Delay between consecutive platforms of a topic
    pub stagger_minutes: u32,

    /// Delay used when the calendar cannot be read
    pub fallback_delay_hours: u32,

    /// Default fan-out order for post plans
    pub platforms: Vec<Platform>,
}

/// Calendar source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Scheduling API base URL
    pub base_url: String,

    /// Bearer API key (optional)
    pub api_key: Option<String>,

    /// Posts listing path
    pub posts_path: String,

    /// Connectivity check path
    pub health_path: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retries after the first failed request
    pub max_retries: u32,

    /// First backoff delay in milliseconds
    pub retry_base_delay_ms: u64,

    /// JSON snapshot used instead of the API when set
    pub snapshot_file: Option<PathBuf>,
}

/// Inspection server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (host:port)
    pub bind_address: String,

    /// Enable CORS
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables over defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load the file when given, overlay the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `CADENCE_*` variables read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
        where
            T: std::str::FromStr,
            T::Err: std::fmt::Display,
            F: Fn(&str) -> Option<String>,
        {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<T>()
                    .map(Some)
                    .map_err(|e| anyhow::anyhow!("Invalid value for {key}: {e}")),
                None => Ok(None),
            }
        }

        let s = &mut self.scheduling;
        if let Some(v) = lookup("CADENCE_TIMEZONE") {
            s.timezone = v;
        }
        if let Some(v) = lookup("CADENCE_TIME_SLOTS") {
            s.time_slots = v
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = parsed(&lookup, "CADENCE_GROUPING_WINDOW_MINUTES")? {
            s.grouping_window_minutes = v;
        }
        if let Some(v) = parsed(&lookup, "CADENCE_FALLBACK_SPACING_MINUTES")? {
            s.fallback_spacing_minutes = v;
        }
        if let Some(v) = parsed(&lookup, "CADENCE_CASCADE_WINDOW_DAYS")? {
            s.cascade_window_days = v;
        }
        if let Some(v) = parsed(&lookup, "CADENCE_DISPLAY_DAYS")? {
            s.display_days = v;
        }
        if let Some(v) = parsed(&lookup, "CADENCE_STAGGER_MINUTES")? {
            s.stagger_minutes = v;
        }
        if let Some(v) = parsed(&lookup, "CADENCE_FALLBACK_DELAY_HOURS")? {
            s.fallback_delay_hours = v;
        }
        if let Some(v) = lookup("CADENCE_PLATFORMS") {
            s.platforms = Platform::parse_list(&v).map_err(|e| anyhow::anyhow!(e))?;
        }

        let c = &mut self.calendar;
        if let Some(v) = lookup("CADENCE_CALENDAR_URL") {
            c.base_url = v;
        }
        if let Some(v) = lookup("CADENCE_API_KEY") {
            c.api_key = Some(v);
        }
        if let Some(v) = parsed(&lookup, "CADENCE_CALENDAR_TIMEOUT")? {
            c.request_timeout_secs = v;
        }
        if let Some(v) = parsed(&lookup, "CADENCE_CALENDAR_MAX_RETRIES")? {
            c.max_retries = v;
        }
        if let Some(v) = lookup("CADENCE_SNAPSHOT_FILE") {
            c.snapshot_file = Some(PathBuf::from(v));
        }

        if let Some(v) = lookup("CADENCE_BIND_ADDRESS") {
            self.server.bind_address = v;
        }
        if let Some(v) = lookup("CADENCE_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("CADENCE_LOG_FORMAT") {
            self.logging.format = v;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let s = &self.scheduling;

        s.time_context().context("Invalid scheduling.timezone")?;
        s.slot_schedule().context("Invalid scheduling.time_slots")?;

        if s.cascade_window_days < DAYS_PER_WEEK {
            anyhow::bail!(
                "cascade_window_days must be at least {DAYS_PER_WEEK}, got {}",
                s.cascade_window_days
            );
        }

        if s.display_days < s.cascade_window_days {
            anyhow::bail!("display_days must not be shorter than cascade_window_days");
        }

        if s.grouping_window_minutes == 0 {
            anyhow::bail!("grouping_window_minutes must be greater than 0");
        }

        if s.fallback_spacing_minutes <= s.grouping_window_minutes {
            anyhow::bail!("fallback_spacing_minutes must exceed grouping_window_minutes");
        }

        if s.stagger_minutes == 0 || i64::from(s.stagger_minutes) > MAX_STAGGER_MINUTES {
            anyhow::bail!("stagger_minutes must be between 1 and {MAX_STAGGER_MINUTES}");
        }

        if s.fallback_delay_hours == 0 {
            anyhow::bail!("fallback_delay_hours must be greater than 0");
        }

        if self.calendar.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }

    /// Get calendar request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.calendar.request_timeout_secs)
    }
}

impl SchedulingConfig {
    /// Timezone context for the engine
    pub fn time_context(&self) -> SchedulerResult<TimeContext> {
        TimeContext::from_name(&self.timezone)
    }

    /// Fixed slot schedule for the engine
    pub fn slot_schedule(&self) -> SchedulerResult<SlotSchedule> {
        SlotSchedule::parse(&self.time_slots)
    }

    /// Grouping window
    pub fn grouping_window(&self) -> ChronoDuration {
        ChronoDuration::minutes(i64::from(self.grouping_window_minutes))
    }

    /// Fallback spacing
    pub fn fallback_spacing(&self) -> ChronoDuration {
        ChronoDuration::minutes(i64::from(self.fallback_spacing_minutes))
    }

    /// Stagger increment
    pub fn stagger_increment(&self) -> ChronoDuration {
        ChronoDuration::minutes(i64::from(self.stagger_minutes))
    }

    /// Delay of the data-free fallback decision
    pub fn fallback_delay(&self) -> ChronoDuration {
        ChronoDuration::hours(i64::from(self.fallback_delay_hours))
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            timezone: String::from(DEFAULT_TIMEZONE),
            time_slots: DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect(),
            grouping_window_minutes: 120,
            fallback_spacing_minutes: 150,
            cascade_window_days: DEFAULT_WINDOW_DAYS,
            display_days: 28,
            stagger_minutes: 10,
            fallback_delay_hours: 24,
            platforms: vec![Platform::Twitter, Platform::Instagram, Platform::Facebook],
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:3000/api"),
            api_key: None,
            posts_path: String::from("/posts"),
            health_path: String::from("/health"),
            request_timeout_secs: 10,
            max_retries: 3,
            retry_base_delay_ms: 500,
            snapshot_file: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: String::from("127.0.0.1:8080"),
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_window() {
        let mut config = Config::default();
        config.scheduling.cascade_window_days = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_shorter_than_window() {
        let mut config = Config::default();
        config.scheduling.cascade_window_days = 14;
        config.scheduling.display_days = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_spacing_must_exceed_window() {
        let mut config = Config::default();
        config.scheduling.fallback_spacing_minutes = 60;
        assert!(config.validate().is_err());

        config.scheduling.fallback_spacing_minutes = 120;
        assert!(config.validate().is_err());

        config.scheduling.fallback_spacing_minutes = 121;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_slots_and_timezone() {
        let mut config = Config::default();
        config.scheduling.time_slots = vec![];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scheduling.time_slots = vec!["12:00".into(), "09:00".into()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scheduling.timezone = "Atlantis/Capital".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stagger_bounds() {
        let mut config = Config::default();
        config.scheduling.stagger_minutes = 0;
        assert!(config.validate().is_err());
        config.scheduling.stagger_minutes = 61;
        assert!(config.validate().is_err());
        config.scheduling.stagger_minutes = 60;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overlay() {
        let mut config = Config::default();
        config
            .apply_env(lookup(&[
                ("CADENCE_TIMEZONE", "Europe/Paris"),
                ("CADENCE_TIME_SLOTS", "08:00, 18:00"),
                ("CADENCE_CASCADE_WINDOW_DAYS", "14"),
                ("CADENCE_PLATFORMS", "linkedin,x"),
                ("CADENCE_API_KEY", "secret"),
            ]))
            .unwrap();

        assert_eq!(config.scheduling.timezone, "Europe/Paris");
        assert_eq!(config.scheduling.time_slots, vec!["08:00", "18:00"]);
        assert_eq!(config.scheduling.cascade_window_days, 14);
        assert_eq!(
            config.scheduling.platforms,
            vec![Platform::Linkedin, Platform::Twitter]
        );
        assert_eq!(config.calendar.api_key.as_deref(), Some("secret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overlay_rejects_bad_numbers() {
        let mut config = Config::default();
        let result = config.apply_env(lookup(&[("CADENCE_STAGGER_MINUTES", "ten")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [scheduling]
            timezone = "America/Chicago"
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduling.timezone, "America/Chicago");
        assert_eq!(config.scheduling.grouping_window_minutes, 120);
        assert_eq!(config.server.bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn test_duration_helpers() {
        let s = SchedulingConfig::default();
        assert_eq!(s.grouping_window(), ChronoDuration::minutes(120));
        assert_eq!(s.fallback_delay(), ChronoDuration::hours(24));
        assert_eq!(Config::default().request_timeout(), Duration::from_secs(10));
    }
}
