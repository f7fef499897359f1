//! Unified error handling for the cadence crate
//!
//! Domain modules keep their own error enums ([`SchedulerError`],
//! [`CalendarError`]); this module wraps them into a single [`Error`] used
//! at module boundaries, the HTTP API and the binary.
//!
//! - [`CadenceErrorTrait`] - common interface for error classification
//! - [`ErrorCategory`] - classification of errors for handling strategies
//! - [`Error`] - unified error enum
//!
//! Recoverable errors let callers fall back to a conservative decision;
//! unrecoverable ones are configuration or invariant problems and must
//! reach the top level.

use thiserror::Error;

pub use crate::calendar::CalendarError;
pub use crate::scheduler::error::SchedulerError;

/// Common trait for cadence error types
pub trait CadenceErrorTrait: std::error::Error {
    /// Whether the caller may degrade gracefully instead of failing
    fn is_recoverable(&self) -> bool;

    /// Error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Calendar connectivity and HTTP errors
    Network,
    /// Payload decoding errors
    Parsing,
    /// File and snapshot errors
    Storage,
    /// Configuration and validation errors
    Config,
    /// Scheduling computation errors
    Scheduler,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short label for logs and API responses
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Scheduler => "scheduler",
            Self::Other => "other",
        }
    }
}

impl CadenceErrorTrait for SchedulerError {
    fn is_recoverable(&self) -> bool {
        SchedulerError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        if self.is_config_error() {
            ErrorCategory::Config
        } else {
            ErrorCategory::Scheduler
        }
    }
}

impl CadenceErrorTrait for CalendarError {
    fn is_recoverable(&self) -> bool {
        CalendarError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Unavailable(_) | Self::Network(_) | Self::Http { .. } => ErrorCategory::Network,
            Self::Decode(_) => ErrorCategory::Parsing,
            Self::Snapshot { .. } => ErrorCategory::Storage,
            Self::InvalidConfig(_) => ErrorCategory::Config,
        }
    }
}

/// Unified error type for the cadence crate
#[derive(Error, Debug)]
pub enum Error {
    /// Scheduling computation errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Calendar adapter errors
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CadenceErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Scheduler(e) => e.is_recoverable(),
            Self::Calendar(e) => e.is_recoverable(),
            Self::Config(_) | Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Scheduler(e) => CadenceErrorTrait::category(e),
            Self::Calendar(e) => CadenceErrorTrait::category(e),
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: format!("{err:#}"),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
