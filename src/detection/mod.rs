//! Threshold-based detectors over run-ordered series.
//!
//! Every detector here is a pure function of its inputs. Configuration
//! mistakes are returned as errors before any data is inspected; data that is
//! too thin to judge is reported through [`crate::insights::Reason`] instead.

mod baseline;
mod change_points;
mod flakes;
mod named_metrics;
mod regression;

use std::cmp::Ordering;

use crate::error::{HunterError, Result};

pub use baseline::{estimate_baseline, BaselineStrategy, DEFAULT_TRIM_RATIO};
pub use change_points::{detect_change_points, ChangePointParams};
pub use flakes::{detect_flakes, FlakeParams};
pub use named_metrics::{detect_named_change_points, detect_named_regressions};
pub use regression::{detect_regressions, RegressionParams};

pub(crate) fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// The most recent `history_window` items, or all of them when unset.
pub(crate) fn tail<T>(values: &[T], history_window: Option<usize>) -> &[T] {
    match history_window {
        Some(window) if window < values.len() => &values[values.len() - window..],
        _ => values,
    }
}

pub(crate) fn validate_history_window(history_window: Option<usize>) -> Result<()> {
    match history_window {
        Some(0) => Err(HunterError::invalid("history_window", "must be >= 1 when set")),
        _ => Ok(()),
    }
}

pub(crate) fn validate_at_least_one(name: &'static str, value: usize) -> Result<()> {
    if value >= 1 {
        Ok(())
    } else {
        Err(HunterError::invalid(name, "must be >= 1"))
    }
}

pub(crate) fn validate_min_delta_pct(min_delta_pct: f64) -> Result<()> {
    if min_delta_pct.is_finite() {
        Ok(())
    } else {
        Err(HunterError::invalid(
            "min_delta_pct",
            format!("must be a finite number, got {min_delta_pct}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_keeps_most_recent_items() {
        let values = [1, 2, 3, 4, 5];
        assert_eq!(tail(&values, Some(2)), &[4, 5]);
        assert_eq!(tail(&values, Some(5)), &values);
        assert_eq!(tail(&values, Some(10)), &values, "Oversized window keeps everything");
        assert_eq!(tail(&values, None), &values);
    }

    #[test]
    fn history_window_must_be_positive() {
        assert!(validate_history_window(None).is_ok());
        assert!(validate_history_window(Some(1)).is_ok());
        assert!(validate_history_window(Some(0)).is_err());
    }

    #[test]
    fn min_delta_pct_must_be_finite() {
        assert!(validate_min_delta_pct(0.0).is_ok());
        assert!(validate_min_delta_pct(-0.5).is_ok());
        assert!(validate_min_delta_pct(f64::NAN).is_err());
        assert!(validate_min_delta_pct(f64::INFINITY).is_err());
    }
}
