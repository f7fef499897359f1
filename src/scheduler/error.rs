//! Error types for the scheduler module

use std::fmt;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
///
/// Every variant except [`SchedulerError::NoFreeSlot`] describes a
/// configuration or programming error and is never recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The fixed slot schedule has no entries
    EmptySlotSchedule,

    /// Slot time string could not be parsed
    InvalidSlotTime {
        value: String,
    },

    /// Slot times are not strictly increasing
    UnorderedSlots {
        previous: String,
        next: String,
    },

    /// Cascade window shorter than one week
    InvalidWindow {
        days: usize,
        minimum: usize,
    },

    /// A duration setting is zero, negative or out of range
    InvalidDuration {
        field: String,
        reason: String,
    },

    /// Unknown IANA timezone
    InvalidTimezone {
        tz: String,
    },

    /// Every candidate slot on the target day is taken
    NoFreeSlot {
        date: String,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySlotSchedule => {
                write!(f, "Slot schedule is empty. At least one daily time slot is required")
            }
            Self::InvalidSlotTime { value } => {
                write!(f, "Invalid slot time '{}'. Expected HH:MM", value)
            }
            Self::UnorderedSlots { previous, next } => {
                write!(
                    f,
                    "Slot times must be strictly increasing: '{}' is not after '{}'",
                    next, previous
                )
            }
            Self::InvalidWindow { days, minimum } => {
                write!(
                    f,
                    "Invalid cascade window of {} days. Must cover at least {} days",
                    days, minimum
                )
            }
            Self::InvalidDuration { field, reason } => {
                write!(f, "Invalid duration for '{}': {}", field, reason)
            }
            Self::InvalidTimezone { tz } => {
                write!(f, "Invalid timezone: {}", tz)
            }
            Self::NoFreeSlot { date } => {
                write!(f, "No free time slot left on {}", date)
            }
        }
    }
}

impl std::error::Error for SchedulerError {}

impl SchedulerError {
    /// Create an invalid slot time error
    pub fn invalid_slot_time(value: impl Into<String>) -> Self {
        Self::InvalidSlotTime {
            value: value.into(),
        }
    }

    /// Create an invalid window error
    pub fn invalid_window(days: usize, minimum: usize) -> Self {
        Self::InvalidWindow { days, minimum }
    }

    /// Create an invalid duration error
    pub fn invalid_duration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid timezone error
    pub fn invalid_timezone(tz: impl Into<String>) -> Self {
        Self::InvalidTimezone { tz: tz.into() }
    }

    /// Create a no free slot error
    pub fn no_free_slot(date: impl Into<String>) -> Self {
        Self::NoFreeSlot { date: date.into() }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoFreeSlot { .. })
    }

    /// Check if the error stems from invalid configuration
    pub fn is_config_error(&self) -> bool {
        !self.is_recoverable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_slot_time_error() {
        let err = SchedulerError::invalid_slot_time("25:99");
        assert!(err.to_string().contains("25:99"));
        assert!(err.to_string().contains("HH:MM"));
    }

    #[test]
    fn test_invalid_window_error() {
        let err = SchedulerError::invalid_window(3, 7);
        assert!(err.to_string().contains("3 days"));
        assert!(err.to_string().contains("7"));
    }

    #[test]
    fn test_unordered_slots_message() {
        let err = SchedulerError::UnorderedSlots {
            previous: "12:30".to_string(),
            next: "09:00".to_string(),
        };
        assert!(err.to_string().contains("'09:00' is not after '12:30'"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(SchedulerError::no_free_slot("2024-01-15").is_recoverable());
        assert!(!SchedulerError::EmptySlotSchedule.is_recoverable());
        assert!(SchedulerError::invalid_timezone("Nowhere").is_config_error());
    }
}
