use log::debug;
use serde::{Deserialize, Serialize};

use super::baseline::{estimate_baseline, validate_trim_ratio, BaselineStrategy, DEFAULT_TRIM_RATIO};
use super::{tail, validate_at_least_one, validate_history_window, validate_min_delta_pct};
use crate::error::Result;
use crate::insights::{DetectionResult, Reason, Regression};

/// Settings for comparing the latest value of a series against its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegressionParams {
    /// Minimum fractional increase reported as a regression (0.2 = 20%)
    #[serde(default = "default_min_delta_pct")]
    pub min_delta_pct: f64,

    #[serde(default)]
    pub baseline_strategy: BaselineStrategy,

    /// Fraction dropped from each end for the trimmed mean
    #[serde(default = "default_trim_ratio")]
    pub trim_ratio: f64,

    /// Historical points required before judging
    #[serde(default = "default_min_history")]
    pub min_history: usize,

    /// Only the most recent N historical points feed the baseline
    #[serde(default)]
    pub history_window: Option<usize>,
}

impl Default for RegressionParams {
    fn default() -> Self {
        Self {
            min_delta_pct: default_min_delta_pct(),
            baseline_strategy: BaselineStrategy::default(),
            trim_ratio: default_trim_ratio(),
            min_history: default_min_history(),
            history_window: None,
        }
    }
}

fn default_min_delta_pct() -> f64 {
    0.2
}

fn default_trim_ratio() -> f64 {
    DEFAULT_TRIM_RATIO
}

fn default_min_history() -> usize {
    1
}

impl RegressionParams {
    /// Checks every setting up front so bad configuration never depends on data.
    ///
    /// # Errors
    ///
    /// Returns error for a non-finite threshold, `min_history` of zero, a zero
    /// `history_window`, or an out-of-range trim ratio with the trimmed mean.
    pub fn validate(&self) -> Result<()> {
        validate_min_delta_pct(self.min_delta_pct)?;
        validate_at_least_one("min_history", self.min_history)?;
        validate_history_window(self.history_window)?;
        if self.baseline_strategy == BaselineStrategy::TrimmedMean {
            validate_trim_ratio(self.trim_ratio)?;
        }
        Ok(())
    }

    /// Historical points that feed the baseline, or `None` when `values` has
    /// no current point to compare.
    pub(crate) fn baseline_window<'a>(&self, values: &'a [f64]) -> Option<&'a [f64]> {
        match values.split_last() {
            Some((_, historical)) if !historical.is_empty() => {
                Some(tail(historical, self.history_window))
            }
            _ => None,
        }
    }

    /// Whether `values` carries enough history for a verdict.
    pub(crate) fn has_enough_history(&self, values: &[f64]) -> bool {
        self.baseline_window(values)
            .is_some_and(|window| window.len() >= self.min_history)
    }
}

/// Decides whether the last value of `values` regressed against the ones
/// before it.
///
/// `values` must be ordered oldest first. Only increases are reported, and a
/// positive delta exactly equal to `min_delta_pct` counts as a regression.
///
/// # Errors
///
/// Returns error only for invalid `params`; thin or degenerate data is
/// reported through [`DetectionResult::reason`].
pub fn detect_regressions(
    values: &[f64],
    metric_name: &str,
    params: &RegressionParams,
) -> Result<DetectionResult> {
    params.validate()?;

    let Some((&current, _)) = values.split_last() else {
        return Ok(DetectionResult::with_reason(Reason::InsufficientHistory));
    };

    let historical = match params.baseline_window(values) {
        Some(window) if window.len() >= params.min_history => window,
        _ => {
            debug!("{metric_name}: {} points is not enough history", values.len());
            return Ok(DetectionResult::with_reason(Reason::InsufficientHistory));
        }
    };

    let Some(baseline) =
        estimate_baseline(historical, params.baseline_strategy, params.trim_ratio)?
    else {
        return Ok(DetectionResult::with_reason(Reason::InsufficientHistory));
    };

    if baseline <= 0.0 {
        debug!("{metric_name}: baseline {baseline} is not positive");
        return Ok(DetectionResult::with_reason(Reason::NonPositiveBaseline));
    }

    // Only strict increases count, even with a zero or negative threshold
    let delta_pct = (current - baseline) / baseline;
    if delta_pct <= 0.0 || delta_pct < params.min_delta_pct {
        return Ok(DetectionResult::default());
    }

    debug!("{metric_name}: {current} vs baseline {baseline} ({delta_pct:+.3})");
    Ok(DetectionResult {
        regressions: vec![Regression {
            metric_name: metric_name.to_string(),
            baseline,
            current,
            delta_pct,
        }],
        reason: None,
    })
}
