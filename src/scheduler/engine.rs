//! Cascade decision engine
//!
//! Orchestrates one decision run: fetch posts for the window from the
//! calendar adapter (the only suspension point), drop malformed records,
//! group the rest into topics, run the cascade analysis and pick a
//! conflict-free slot on the target day. The engine holds no state between
//! calls, so an unchanged calendar always yields the same decision.
//!
//! The engine never writes to the calendar. Its outputs are advisory:
//! [`CascadeDecision`] for the next topic, [`CascadePattern`] for
//! inspection, and [`PostPlan`] with per-platform publish times.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::Serialize;
use std::sync::Arc;

use crate::calendar::CalendarAdapter;
use crate::config::SchedulingConfig;
use crate::error::{CadenceErrorTrait, Result};
use crate::models::{Platform, ScheduledPost, Topic};

use super::cascade::{week_minimums, CascadeAnalyzer};
use super::error::{SchedulerError, SchedulerResult};
use super::grouping::{topics_by_day, TopicGrouper};
use super::slots::{RejectedSlot, SlotPicker, SlotSource};
use super::stagger::{StaggerCalculator, StaggerPlan};
use super::time::{day_name, TimeContext};

// ============================================================================
// Decision Types
// ============================================================================

/// Why the slot was chosen and which candidates were rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictAnalysis {
    /// How the slot was found; absent for fallback decisions
    pub slot_source: Option<SlotSource>,
    pub rejected: Vec<RejectedSlot>,
    pub reason: String,
    pub used_fallback: bool,
}

/// The single next scheduling action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeDecision {
    /// 0-based offset from today
    pub day: usize,
    pub date: NaiveDate,
    pub day_name: String,
    /// Topics on the target day before this decision
    pub current_topics: usize,
    /// Level the target day reaches with the new topic
    pub new_level: usize,
    /// Whether `new_level` exceeds the window maximum
    pub is_level_increase: bool,
    /// Topic count of the fullest day in the window
    pub max_level: usize,
    pub optimal_time_slot: DateTime<FixedOffset>,
    /// Local `YYYY-MM-DD HH:MM`
    pub optimal_time_local: String,
    pub conflict_analysis: ConflictAnalysis,
    /// Human-readable instruction
    pub action: String,
    /// Whether this is the data-free fallback decision
    pub fallback: bool,
}

/// Decision plus the outcome of the caller-side fallback policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionReport {
    pub success: bool,
    pub message: String,
    pub fallback_used: bool,
    pub skipped_posts: usize,
    pub decision: CascadeDecision,
}

/// One platform's entry in a post plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedPost {
    pub platform: Platform,
    pub publish_at: DateTime<FixedOffset>,
    /// Timestamp as sent to the scheduling API
    pub publish_at_api: String,
    pub offset_minutes: i64,
}

/// Staggered publish times for a decided topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPlan {
    pub topic_time: DateTime<FixedOffset>,
    pub entries: Vec<PlannedPost>,
}

// ============================================================================
// Pattern Types
// ============================================================================

/// Topic as shown in the pattern view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicDetail {
    /// Local `HH:MM` of the representative time
    pub time: String,
    pub published_at: DateTime<FixedOffset>,
    pub platforms: Vec<Platform>,
    pub post_count: usize,
}

/// One day of the pattern view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternDay {
    pub offset: usize,
    pub week: usize,
    pub date: NaiveDate,
    pub day_name: String,
    pub topic_count: usize,
    /// Whether the day takes part in the cascade decision
    pub in_cascade_window: bool,
    pub topics: Vec<TopicDetail>,
}

/// Day-by-day cascade view with the next action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadePattern {
    pub today: NaiveDate,
    pub timezone: String,
    pub window_days: usize,
    pub display_days: usize,
    pub days: Vec<PatternDay>,
    /// Minimum topic count of each displayed week
    pub week_minimums: Vec<usize>,
    pub max_level: usize,
    pub skipped_posts: usize,
    /// Absent when no slot could be picked on the target day
    pub next_action: Option<CascadeDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action_error: Option<String>,
}

impl CascadePattern {
    /// Render a plain-text table
    pub fn render_table(&self) -> String {
        let mut lines = vec![
            format!(
                "Cascade pattern from {} ({}), window {} days, max level {}",
                self.today, self.timezone, self.window_days, self.max_level
            ),
            format!("{:>4}  {:<10}  {:<9}  {:>6}  Times", "Day", "Date", "Weekday", "Topics"),
        ];

        for day in &self.days {
            if day.offset > 0 && day.offset % 7 == 0 {
                lines.push(String::new());
            }
            let times: Vec<&str> = day.topics.iter().map(|t| t.time.as_str()).collect();
            let is_next = self.next_action.as_ref().is_some_and(|d| d.day == day.offset);
            let marker = if is_next { "  <- next" } else { "" };
            let window = if day.in_cascade_window { ' ' } else { '~' };
            lines.push(format!(
                "{:>4}{} {:<10}  {:<9}  {:>6}  {}{}",
                day.offset,
                window,
                day.date,
                day.day_name,
                day.topic_count,
                times.join(", "),
                marker
            ));
        }

        lines.push(String::new());
        lines.push(format!("Week minimums: {:?}", self.week_minimums));
        if self.skipped_posts > 0 {
            lines.push(format!("Skipped malformed posts: {}", self.skipped_posts));
        }
        match (&self.next_action, &self.next_action_error) {
            (Some(decision), _) => lines.push(format!("Next: {}", decision.action)),
            (None, Some(error)) => lines.push(format!("Next: unavailable ({error})")),
            (None, None) => lines.push("Next: unavailable".to_string()),
        }
        lines.join("\n")
    }
}

// ============================================================================
// Cascade Engine
// ============================================================================

struct CalendarSnapshot {
    topics: Vec<Topic>,
    skipped: usize,
}

/// Stateless cascade decision engine
pub struct CascadeEngine {
    calendar: Arc<dyn CalendarAdapter>,
    ctx: TimeContext,
    grouper: TopicGrouper,
    analyzer: CascadeAnalyzer,
    picker: SlotPicker,
    stagger: StaggerCalculator,
    display_days: usize,
    fallback_delay: Duration,
    default_platforms: Vec<Platform>,
}

impl CascadeEngine {
    /// Build an engine from scheduling configuration
    ///
    /// Fails on any configuration invariant violation.
    pub fn new(calendar: Arc<dyn CalendarAdapter>, config: &SchedulingConfig) -> SchedulerResult<Self> {
        let ctx = config.time_context()?;
        let window = config.grouping_window();
        let picker = SlotPicker::new(config.slot_schedule()?, window, config.fallback_spacing())?;
        let analyzer = CascadeAnalyzer::new(config.cascade_window_days)?;
        let stagger = StaggerCalculator::new(config.stagger_increment())?;

        let fallback_delay = config.fallback_delay();
        if fallback_delay <= Duration::zero() {
            return Err(SchedulerError::invalid_duration(
                "fallback_delay_hours",
                "must be positive",
            ));
        }

        Ok(Self {
            calendar,
            ctx,
            grouper: TopicGrouper::new(ctx, window),
            analyzer,
            picker,
            stagger,
            display_days: config.display_days.max(analyzer.window_days()),
            fallback_delay,
            default_platforms: config.platforms.clone(),
        })
    }

    /// Timezone context
    pub fn time_context(&self) -> &TimeContext {
        &self.ctx
    }

    /// Cascade window length in days
    pub fn window_days(&self) -> usize {
        self.analyzer.window_days()
    }

    /// Pattern view length in days
    pub fn display_days(&self) -> usize {
        self.display_days
    }

    /// Calendar adapter in use
    pub fn calendar(&self) -> &Arc<dyn CalendarAdapter> {
        &self.calendar
    }

    /// Next action for the current moment
    pub async fn next_action(&self) -> Result<CascadeDecision> {
        self.next_action_at(self.ctx.now()).await
    }

    /// Next action with `now` fixing "today"
    pub async fn next_action_at(&self, now: DateTime<FixedOffset>) -> Result<CascadeDecision> {
        let (decision, _) = self.evaluate(now).await?;
        Ok(decision)
    }

    /// Pattern view for the current moment
    pub async fn visualize_cascade_pattern(&self) -> Result<CascadePattern> {
        self.visualize_cascade_pattern_at(self.ctx.now()).await
    }

    /// Pattern view over `display_days` starting at the local date of `now`
    pub async fn visualize_cascade_pattern_at(
        &self,
        now: DateTime<FixedOffset>,
    ) -> Result<CascadePattern> {
        let today = self.ctx.local_date(now);
        let snapshot = self.load_topics(today, self.display_days).await?;
        let max_level = self.analyzer.analyze(today, &snapshot.topics).max_level;
        let (next_action, next_action_error) = match self.decide(today, &snapshot.topics) {
            Ok(decision) => (Some(decision), None),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "No next action for pattern view");
                (None, Some(e.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let display = CascadeAnalyzer::new(self.display_days)?;
        let counts = display.day_counts(today, &snapshot.topics);
        let by_day = topics_by_day(&snapshot.topics);
        let window_days = self.analyzer.window_days();

        let days = counts
            .iter()
            .enumerate()
            .map(|(offset, &topic_count)| {
                let date = today + Duration::days(offset as i64);
                let topics = by_day
                    .get(&date)
                    .map(|list| list.iter().map(|t| self.topic_detail(t)).collect())
                    .unwrap_or_default();
                PatternDay {
                    offset,
                    week: offset / 7,
                    date,
                    day_name: day_name(date),
                    topic_count,
                    in_cascade_window: offset < window_days,
                    topics,
                }
            })
            .collect();

        Ok(CascadePattern {
            today,
            timezone: self.ctx.timezone().name().to_string(),
            window_days,
            display_days: self.display_days,
            days,
            week_minimums: week_minimums(&counts),
            max_level,
            skipped_posts: snapshot.skipped,
            next_action,
            next_action_error,
        })
    }

    /// Conservative decision used when the calendar cannot be read
    ///
    /// The calendar is treated as empty, so the topic opens level 1 and
    /// counts as a level increase.
    pub fn fallback_decision(&self, now: DateTime<FixedOffset>) -> CascadeDecision {
        let time = self.ctx.localize(now + self.fallback_delay).fixed_offset();
        let today = self.ctx.local_date(now);
        let date = self.ctx.local_date(time);
        let hours = self.fallback_delay.num_hours();

        CascadeDecision {
            day: (date - today).num_days().max(0) as usize,
            date,
            day_name: day_name(date),
            current_topics: 0,
            new_level: 1,
            is_level_increase: true,
            max_level: 0,
            optimal_time_slot: time,
            optimal_time_local: self.ctx.format_local(time),
            conflict_analysis: ConflictAnalysis {
                slot_source: None,
                rejected: Vec::new(),
                reason: format!("calendar data unavailable; scheduling {hours}h from now"),
                used_fallback: true,
            },
            action: format!(
                "Schedule topic at {} ({hours}h from now, calendar not consulted)",
                self.ctx.format_local(time)
            ),
            fallback: true,
        }
    }

    /// Next action with the caller-side fallback policy applied
    pub async fn recommend(&self) -> Result<ActionReport> {
        self.recommend_at(self.ctx.now()).await
    }

    /// Check connectivity, decide, and degrade to the fallback decision on
    /// recoverable failures
    ///
    /// Configuration and invariant errors still propagate.
    pub async fn recommend_at(&self, now: DateTime<FixedOffset>) -> Result<ActionReport> {
        if let Err(e) = self.calendar.test_connection().await {
            tracing::warn!(
                calendar = self.calendar.name(),
                error = %e,
                "Calendar unreachable, using fallback decision"
            );
            return Ok(self.fallback_report(now, format!("Fallback decision used: {e}")));
        }

        match self.evaluate(now).await {
            Ok((decision, skipped_posts)) => Ok(ActionReport {
                success: true,
                message: decision.action.clone(),
                fallback_used: false,
                skipped_posts,
                decision,
            }),
            Err(e) if e.is_recoverable() => {
                tracing::warn!(error = %e, "Decision failed, using fallback decision");
                Ok(self.fallback_report(now, format!("Fallback decision used: {e}")))
            }
            Err(e) => Err(e),
        }
    }

    /// Stagger the platforms of a decided topic
    ///
    /// An empty platform list uses the configured default fan-out.
    pub fn plan_post(&self, decision: &CascadeDecision, platforms: &[Platform]) -> PostPlan {
        let platforms = if platforms.is_empty() {
            self.default_platforms.as_slice()
        } else {
            platforms
        };

        let plan = self.stagger(decision.optimal_time_slot, platforms);
        PostPlan {
            topic_time: plan.base,
            entries: plan
                .entries
                .into_iter()
                .map(|e| PlannedPost {
                    platform: e.platform,
                    publish_at_api: self.ctx.format_api(e.publish_at),
                    publish_at: e.publish_at,
                    offset_minutes: e.offset_minutes,
                })
                .collect(),
        }
    }

    /// Stagger platforms from an arbitrary base time
    pub fn stagger(&self, base: DateTime<FixedOffset>, platforms: &[Platform]) -> StaggerPlan {
        self.stagger.stagger(base, platforms)
    }

    /// Pure decision over already grouped topics
    pub fn decide(&self, today: NaiveDate, topics: &[Topic]) -> SchedulerResult<CascadeDecision> {
        let analysis = self.analyzer.analyze(today, topics);
        let target = analysis.target;

        let occupied: Vec<DateTime<FixedOffset>> = topics
            .iter()
            .filter(|t| t.date == target.date)
            .map(|t| t.representative_time)
            .collect();

        let choice = self.picker.pick(&self.ctx, target.date, &occupied)?;
        let used_fallback = choice.used_fallback();
        let name = day_name(target.date);

        let pass = if target.is_level_increase {
            "new cascade pass"
        } else {
            "filling current level"
        };
        let action = format!(
            "Schedule topic on {} {} at {} (day {}, level {} -> {}, {})",
            name,
            target.date,
            self.ctx.format_clock(choice.time),
            target.day,
            target.current_topics,
            target.new_level,
            pass
        );

        tracing::info!(
            day = target.day,
            date = %target.date,
            level = target.new_level,
            slot = %self.ctx.format_clock(choice.time),
            level_increase = target.is_level_increase,
            fallback_slot = used_fallback,
            "Cascade decision"
        );

        Ok(CascadeDecision {
            day: target.day,
            date: target.date,
            day_name: name,
            current_topics: target.current_topics,
            new_level: target.new_level,
            is_level_increase: target.is_level_increase,
            max_level: analysis.max_level,
            optimal_time_slot: choice.time,
            optimal_time_local: self.ctx.format_local(choice.time),
            conflict_analysis: ConflictAnalysis {
                slot_source: Some(choice.source),
                rejected: choice.rejected,
                reason: choice.reason,
                used_fallback,
            },
            action,
            fallback: false,
        })
    }

    async fn evaluate(&self, now: DateTime<FixedOffset>) -> Result<(CascadeDecision, usize)> {
        let today = self.ctx.local_date(now);
        let snapshot = self.load_topics(today, self.analyzer.window_days()).await?;
        let decision = self.decide(today, &snapshot.topics)?;
        Ok((decision, snapshot.skipped))
    }

    async fn load_topics(&self, start: NaiveDate, days: usize) -> Result<CalendarSnapshot> {
        let end = start + Duration::days(days.saturating_sub(1) as i64);
        let records = self.calendar.get_scheduled_posts(start, end).await?;

        let mut posts = Vec::with_capacity(records.len());
        let mut skipped = 0usize;
        for record in &records {
            match ScheduledPost::from_raw(record, &self.ctx) {
                Ok(post) => posts.push(post),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(error = %e, "Skipping malformed post");
                }
            }
        }

        tracing::debug!(
            calendar = self.calendar.name(),
            start = %start,
            end = %end,
            records = records.len(),
            skipped,
            "Loaded calendar snapshot"
        );

        Ok(CalendarSnapshot {
            topics: self.grouper.group(&posts),
            skipped,
        })
    }

    fn topic_detail(&self, topic: &Topic) -> TopicDetail {
        TopicDetail {
            time: self.ctx.format_clock(topic.representative_time),
            published_at: topic.representative_time,
            platforms: topic.platforms.iter().copied().collect(),
            post_count: topic.post_count(),
        }
    }

    fn fallback_report(&self, now: DateTime<FixedOffset>, message: String) -> ActionReport {
        ActionReport {
            success: false,
            message,
            fallback_used: true,
            skipped_posts: 0,
            decision: self.fallback_decision(now),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::StaticCalendar;
    use crate::models::RawPost;
    use chrono::NaiveTime;

    fn ctx() -> TimeContext {
        TimeContext::default()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn now() -> DateTime<FixedOffset> {
        ctx().at(today(), NaiveTime::from_hms_opt(8, 0, 0).unwrap())
    }

    fn post(offset: i64, time: &str, networks: &[&str]) -> RawPost {
        let date = today() + Duration::days(offset);
        RawPost::new(format!("{}T{}:00", date, time), networks)
    }

    fn engine(posts: Vec<RawPost>) -> CascadeEngine {
        let calendar = Arc::new(StaticCalendar::new(posts, ctx()));
        CascadeEngine::new(calendar, &SchedulingConfig::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let calendar: Arc<dyn CalendarAdapter> = Arc::new(StaticCalendar::default());

        let mut config = SchedulingConfig::default();
        config.cascade_window_days = 3;
        assert!(CascadeEngine::new(calendar.clone(), &config).is_err());

        let mut config = SchedulingConfig::default();
        config.time_slots.clear();
        assert!(matches!(
            CascadeEngine::new(calendar.clone(), &config),
            Err(SchedulerError::EmptySlotSchedule)
        ));

        let mut config = SchedulingConfig::default();
        config.fallback_delay_hours = 0;
        assert!(CascadeEngine::new(calendar, &config).is_err());
    }

    #[tokio::test]
    async fn test_empty_calendar() {
        let decision = engine(vec![]).next_action_at(now()).await.unwrap();
        assert_eq!(decision.day, 0);
        assert_eq!(decision.date, today());
        assert_eq!(decision.new_level, 1);
        assert!(decision.is_level_increase);
        assert_eq!(decision.optimal_time_local, "2024-01-15 09:00");
    }

    #[tokio::test]
    async fn test_cross_posted_topic_counts_once() {
        let posts = vec![
            post(0, "09:00", &["twitter"]),
            post(0, "09:10", &["instagram"]),
            post(0, "09:20", &["facebook"]),
        ];
        let decision = engine(posts).next_action_at(now()).await.unwrap();
        assert_eq!(decision.day, 1);
        assert_eq!(decision.current_topics, 0);
        assert_eq!(decision.new_level, 1);
        assert!(!decision.is_level_increase);
        assert_eq!(decision.max_level, 1);
    }

    #[tokio::test]
    async fn test_full_week_starts_new_pass_on_day_zero() {
        let mut posts = Vec::new();
        for day in 0..7 {
            for time in ["09:00", "12:30", "15:15"] {
                posts.push(post(day, time, &["twitter", "instagram"]));
            }
        }

        let decision = engine(posts).next_action_at(now()).await.unwrap();
        assert_eq!(decision.day, 0);
        assert_eq!(decision.current_topics, 3);
        assert_eq!(decision.new_level, 4);
        assert!(decision.is_level_increase);
        assert_eq!(decision.optimal_time_local, "2024-01-15 17:45");
        assert_eq!(decision.conflict_analysis.rejected.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_posts_are_skipped() {
        let posts = vec![
            post(0, "09:00", &["twitter"]),
            RawPost::new("not a date", &["twitter"]),
            post(1, "09:00", &["myspace"]),
        ];
        let engine = engine(posts);
        let report = engine.recommend_at(now()).await.unwrap();
        assert!(report.success);
        assert_eq!(report.skipped_posts, 2);
        assert_eq!(report.decision.day, 1);
    }

    #[tokio::test]
    async fn test_idempotent_decisions() {
        let posts = vec![post(0, "09:00", &["twitter"]), post(2, "12:30", &["facebook"])];
        let engine = engine(posts);
        let first = engine.next_action_at(now()).await.unwrap();
        let second = engine.next_action_at(now()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_offline_calendar_falls_back() {
        let calendar = Arc::new(StaticCalendar::default().offline());
        let engine = CascadeEngine::new(calendar, &SchedulingConfig::default()).unwrap();

        let report = engine.recommend_at(now()).await.unwrap();
        assert!(!report.success);
        assert!(report.fallback_used);
        assert!(report.decision.fallback);
        assert_eq!(report.decision.day, 1);
        assert_eq!(report.decision.optimal_time_slot, now() + Duration::hours(24));
        assert_eq!(report.decision.new_level, 1);
        assert!(report.decision.new_level > report.decision.max_level);
        assert!(report.decision.is_level_increase);
        assert!(report.message.contains("unavailable"));

        assert!(engine.next_action_at(now()).await.is_err());
    }

    #[tokio::test]
    async fn test_pattern_matches_decision() {
        let posts = vec![
            post(0, "09:00", &["twitter"]),
            post(0, "15:00", &["twitter"]),
            post(9, "09:00", &["linkedin", "tiktok"]),
        ];
        let engine = engine(posts);
        let pattern = engine.visualize_cascade_pattern_at(now()).await.unwrap();
        let decision = engine.next_action_at(now()).await.unwrap();

        assert_eq!(pattern.days.len(), 28);
        assert_eq!(pattern.next_action, Some(decision));
        assert!(pattern.next_action_error.is_none());
        assert_eq!(pattern.days[0].topic_count, 2);
        assert_eq!(pattern.days[0].topics[1].time, "15:00");
        assert_eq!(pattern.days[9].topic_count, 1);
        assert!(!pattern.days[9].in_cascade_window);
        assert_eq!(pattern.days[9].week, 1);
        assert_eq!(pattern.week_minimums, vec![0, 0, 0, 0]);
        assert_eq!(pattern.max_level, 2);
        assert_eq!(pattern.days[0].day_name, "Monday");

        let table = pattern.render_table();
        assert!(table.contains("2024-01-15"));
        assert!(table.contains("<- next"));
    }

    #[tokio::test]
    async fn test_plan_post_staggers_platforms() {
        let engine = engine(vec![]);
        let decision = engine.next_action_at(now()).await.unwrap();

        let plan = engine.plan_post(&decision, &[Platform::Linkedin, Platform::Twitter]);
        assert_eq!(plan.topic_time, decision.optimal_time_slot);
        assert_eq!(plan.entries.len(), 2);
        assert_eq!(plan.entries[0].platform, Platform::Linkedin);
        assert_eq!(plan.entries[1].publish_at_api, "2024-01-15T09:10:00-05:00");

        let defaults = engine.plan_post(&decision, &[]);
        assert_eq!(defaults.entries.len(), 3);
        assert_eq!(defaults.entries[2].offset_minutes, 20);
    }

    #[test]
    fn test_decide_reports_slot_fallback() {
        let engine = engine(vec![]);
        let at = |h, m| ctx().at(today(), NaiveTime::from_hms_opt(h, m, 0).unwrap());

        // five separate topics fill all fixed slots on every window day
        let mut topics = Vec::new();
        for offset in 0..7 {
            let date = today() + Duration::days(offset);
            for (h, m) in [(9, 0), (12, 30), (15, 15), (17, 45), (20, 0)] {
                let time = ctx().at(date, NaiveTime::from_hms_opt(h, m, 0).unwrap());
                topics.push(Topic::start(date, ScheduledPost::new(time, [Platform::Twitter])));
            }
        }

        let decision = engine.decide(today(), &topics).unwrap();
        assert_eq!(decision.day, 0);
        assert_eq!(decision.new_level, 6);
        assert!(decision.conflict_analysis.used_fallback);
        // 19:30 is 30 minutes before 20:00, so the slot steps past the latest topic
        assert_eq!(decision.optimal_time_slot, at(22, 30));
        assert_eq!(
            decision.conflict_analysis.slot_source,
            Some(SlotSource::Fallback { steps: 1 })
        );
    }
}
