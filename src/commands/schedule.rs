use anyhow::{Context, Result};
use std::path::Path;

use cadence::config::Config;
use cadence::models::Platform;
use cadence::scheduler::{CascadeDecision, CascadeEngine, StaggerCalculator};

use super::build_calendar;

/// Print the next action, applying the fallback policy
pub async fn next(engine: &CascadeEngine, json: bool) -> Result<()> {
    let report = engine.recommend().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.fallback_used {
        println!("WARNING: {}", report.message);
    }
    print_decision(engine, &report.decision);
    if report.skipped_posts > 0 {
        println!("  Skipped posts: {}", report.skipped_posts);
    }
    Ok(())
}

/// Print the cascade pattern table
pub async fn pattern(engine: &CascadeEngine, json: bool) -> Result<()> {
    let pattern = engine.visualize_cascade_pattern().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pattern)?);
    } else {
        println!("{}", pattern.render_table());
    }
    Ok(())
}

/// Print the next action with staggered platform times
pub async fn plan(engine: &CascadeEngine, platforms: Option<&str>, json: bool) -> Result<()> {
    let platforms = match platforms {
        Some(list) => Platform::parse_list(list).map_err(|e| anyhow::anyhow!(e))?,
        None => Vec::new(),
    };

    let report = engine.recommend().await?;
    let plan = engine.plan_post(&report.decision, &platforms);

    if json {
        let body = serde_json::json!({ "report": report, "plan": plan });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if report.fallback_used {
        println!("WARNING: {}", report.message);
    }
    print_decision(engine, &report.decision);
    println!();
    println!("Platform schedule:");
    for entry in &plan.entries {
        println!(
            "  {:<20} {}  (+{} min)",
            entry.platform.display_name(),
            entry.publish_at_api,
            entry.offset_minutes
        );
    }
    Ok(())
}

/// Print staggered times for an arbitrary base
pub fn stagger(config: &Config, base: &str, platforms: &str) -> Result<()> {
    let ctx = config.scheduling.time_context()?;
    let base = ctx
        .parse(base, None)
        .with_context(|| format!("Invalid base timestamp '{base}'"))?;
    let platforms = Platform::parse_list(platforms).map_err(|e| anyhow::anyhow!(e))?;
    let calculator = StaggerCalculator::new(config.scheduling.stagger_increment())?;

    let plan = calculator.stagger(base, &platforms);
    for entry in &plan.entries {
        println!(
            "{:<20} {}  (+{} min)",
            entry.platform.display_name(),
            ctx.format_api(entry.publish_at),
            entry.offset_minutes
        );
    }
    Ok(())
}

/// Validate configuration and check calendar connectivity
pub async fn check(config: &Config, calendar_file: Option<&Path>) -> Result<()> {
    let s = &config.scheduling;
    println!("Configuration OK");
    println!("  Timezone:        {}", s.timezone);
    println!("  Time slots:      {}", s.time_slots.join(", "));
    println!("  Grouping window: {} min", s.grouping_window_minutes);
    println!("  Cascade window:  {} days", s.cascade_window_days);
    println!("  Stagger:         {} min", s.stagger_minutes);

    let calendar = build_calendar(config, calendar_file)?;
    calendar
        .test_connection()
        .await
        .with_context(|| format!("Calendar '{}' is not reachable", calendar.name()))?;
    println!("Calendar '{}' reachable", calendar.name());
    Ok(())
}

fn print_decision(engine: &CascadeEngine, decision: &CascadeDecision) {
    let ctx = engine.time_context();
    println!("{}", decision.action);
    println!("  Day:        {} ({} {})", decision.day, decision.day_name, decision.date);
    println!(
        "  Level:      {} -> {}{}",
        decision.current_topics,
        decision.new_level,
        if decision.is_level_increase { " (level increase)" } else { "" }
    );
    println!("  Time:       {}", ctx.format_api(decision.optimal_time_slot));
    println!("  Reason:     {}", decision.conflict_analysis.reason);
    for rejected in &decision.conflict_analysis.rejected {
        println!(
            "  Rejected:   {} ({} min from topic at {})",
            rejected.slot, rejected.gap_minutes, rejected.conflicts_with
        );
    }
}
