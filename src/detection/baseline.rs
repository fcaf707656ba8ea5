use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cmp_f64;
use crate::error::{HunterError, Result};

pub const DEFAULT_TRIM_RATIO: f64 = 0.1;

/// How historical samples are reduced to one reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineStrategy {
    Mean,
    #[default]
    Median,
    #[serde(alias = "trimmed-mean")]
    TrimmedMean,
}

impl BaselineStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::TrimmedMean => "trimmed_mean",
        }
    }
}

impl fmt::Display for BaselineStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BaselineStrategy {
    type Err = HunterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "trimmed_mean" | "trimmed-mean" => Ok(Self::TrimmedMean),
            other => Err(HunterError::UnknownBaselineStrategy(other.to_string())),
        }
    }
}

pub(crate) fn validate_trim_ratio(trim_ratio: f64) -> Result<()> {
    if (0.0..0.5).contains(&trim_ratio) {
        Ok(())
    } else {
        Err(HunterError::InvalidTrimRatio(trim_ratio))
    }
}

/// Reduces historical values to a single baseline.
///
/// Returns `Ok(None)` when there is nothing to estimate from: the input is
/// empty, or trimming discarded every value. The trim ratio is only checked
/// for [`BaselineStrategy::TrimmedMean`].
///
/// # Errors
///
/// Returns [`HunterError::InvalidTrimRatio`] if the trimmed mean is requested
/// with a ratio outside `[0, 0.5)`.
pub fn estimate_baseline(
    values: &[f64],
    strategy: BaselineStrategy,
    trim_ratio: f64,
) -> Result<Option<f64>> {
    if strategy == BaselineStrategy::TrimmedMean {
        validate_trim_ratio(trim_ratio)?;
    }

    if values.is_empty() {
        return Ok(None);
    }

    let baseline = match strategy {
        BaselineStrategy::Mean => Some(mean(values)),
        BaselineStrategy::Median => Some(median(values)),
        BaselineStrategy::TrimmedMean => trimmed_mean(values, trim_ratio),
    };

    Ok(baseline)
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| cmp_f64(*a, *b));
    sorted
}

fn median(values: &[f64]) -> f64 {
    let sorted = sorted(values);
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn trimmed_mean(values: &[f64], trim_ratio: f64) -> Option<f64> {
    let len = values.len();
    let trim_count = (len as f64 * trim_ratio).floor() as usize;

    // Unreachable for validated ratios (< 0.5 always leaves a value); kept for
    // the `None` contract of the trimmed estimator.
    if len <= 2 * trim_count {
        return None;
    }

    let sorted = sorted(values);
    Some(mean(&sorted[trim_count..len - trim_count]))
}
