use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cadence::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "cadence",
    version,
    about = "Cascading social media post scheduler",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read posts from a JSON snapshot instead of the scheduling API
    #[arg(long, global = true)]
    calendar_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the next cascade action
    Next {
        /// Print JSON instead of text
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Show the day-by-day cascade pattern
    Pattern {
        /// Print JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Show the next action with staggered platform times
    Plan {
        /// Comma separated platforms (defaults to the configured list)
        #[arg(short, long)]
        platforms: Option<String>,

        /// Print JSON instead of text
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Stagger platforms from a base time
    Stagger {
        /// Base timestamp (RFC 3339 or local YYYY-MM-DDTHH:MM)
        #[arg(short, long)]
        base: String,

        /// Comma separated platforms
        #[arg(short, long)]
        platforms: String,
    },

    /// Run the inspection HTTP API
    Serve {
        /// Bind address (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Validate configuration and test calendar connectivity
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    let calendar_file = cli.calendar_file.as_deref();

    match cli.command {
        Commands::Next { json } => {
            tracing::info!(json = %json, "Starting next command");
            let engine = commands::build_engine(&config, calendar_file)?;
            commands::next(&engine, json).await?;
        }

        Commands::Pattern { json } => {
            tracing::info!(json = %json, "Starting pattern command");
            let engine = commands::build_engine(&config, calendar_file)?;
            commands::pattern(&engine, json).await?;
        }

        Commands::Plan { platforms, json } => {
            tracing::info!(platforms = ?platforms, json = %json, "Starting plan command");
            let engine = commands::build_engine(&config, calendar_file)?;
            commands::plan(&engine, platforms.as_deref(), json).await?;
        }

        Commands::Stagger { base, platforms } => {
            tracing::info!(base = %base, platforms = %platforms, "Starting stagger command");
            commands::stagger(&config, &base, &platforms)?;
        }

        Commands::Serve { bind } => {
            tracing::info!(bind = ?bind, "Starting serve command");
            let engine = commands::build_engine(&config, calendar_file)?;
            commands::serve(&config, engine, bind).await?;
        }

        Commands::Check => {
            tracing::info!("Starting check command");
            commands::check(&config, calendar_file).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("cadence=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("cadence={level},warn"))
            .context("Invalid logging.level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
