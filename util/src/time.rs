//! General time utility functions

use chrono;
use std::time::Duration;
use thiserror::Error;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Reasons a number of seconds cannot be used as a `Duration`.
#[derive(Debug, Error, PartialEq)]
pub enum DurationError {
    #[error("{0} s is not a finite number")]
    NotFinite(f64),

    #[error("{0} s is negative")]
    Negative(f64),

    #[error("{0} s is too long to represent")]
    TooLong(f64),
}

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    if let Some(ns) = duration.num_nanoseconds() {
        Some(ns as f64 / NANOS_PER_SECOND as f64)
    }
    else {
        None
    }
}

/// Convert a parameter given in seconds into a `Duration`, rejecting values
/// which are not finite, negative or too long.
pub fn try_secs_to_duration(seconds: f64) -> Result<Duration, DurationError> {
    if !seconds.is_finite() {
        return Err(DurationError::NotFinite(seconds));
    }
    if seconds < 0.0 {
        return Err(DurationError::Negative(seconds));
    }

    Duration::try_from_secs_f64(seconds).map_err(|_| DurationError::TooLong(seconds))
}

/// Convert a number of seconds into a `Duration`, saturating.
///
/// Negative and NaN values give a zero duration, values too long to
/// represent (including infinity) give `Duration::MAX`.
pub fn secs_to_duration(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::from_secs(0);
    }

    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_secs_to_duration() {
        assert_eq!(secs_to_duration(0.01), Duration::from_millis(10));
        assert_eq!(secs_to_duration(-1.0), Duration::from_secs(0));
        assert_eq!(secs_to_duration(f64::NAN), Duration::from_secs(0));
        assert_eq!(secs_to_duration(1e20), Duration::MAX);
        assert_eq!(secs_to_duration(f64::INFINITY), Duration::MAX);
        assert_eq!(duration_to_seconds(chrono::Duration::milliseconds(1500)), Some(1.5));
    }

    #[test]
    fn test_try_secs_to_duration() {
        assert_eq!(try_secs_to_duration(0.5), Ok(Duration::from_millis(500)));
        assert_eq!(try_secs_to_duration(0.0), Ok(Duration::from_secs(0)));
        assert_eq!(try_secs_to_duration(1e20), Err(DurationError::TooLong(1e20)));
        assert_eq!(
            try_secs_to_duration(f64::INFINITY),
            Err(DurationError::NotFinite(f64::INFINITY))
        );
        assert_eq!(try_secs_to_duration(-0.1), Err(DurationError::Negative(-0.1)));
        assert!(matches!(try_secs_to_duration(f64::NAN), Err(DurationError::NotFinite(_))));
    }
}
