use log::debug;
use serde::{Deserialize, Serialize};

use super::baseline::mean;
use super::{tail, validate_at_least_one, validate_history_window, validate_min_delta_pct};
use crate::error::Result;
use crate::insights::ChangePoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChangePointParams {
    /// Minimum fractional shift between window means
    #[serde(default = "default_min_delta_pct")]
    pub min_delta_pct: f64,

    /// Points in each of the two compared windows
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    #[serde(default)]
    pub history_window: Option<usize>,
}

impl Default for ChangePointParams {
    fn default() -> Self {
        Self {
            min_delta_pct: default_min_delta_pct(),
            window_size: default_window_size(),
            history_window: None,
        }
    }
}

fn default_min_delta_pct() -> f64 {
    0.2
}

fn default_window_size() -> usize {
    3
}

impl ChangePointParams {
    /// # Errors
    ///
    /// Returns error for a non-finite threshold, a zero `window_size` or a zero
    /// `history_window`.
    pub fn validate(&self) -> Result<()> {
        validate_min_delta_pct(self.min_delta_pct)?;
        validate_at_least_one("window_size", self.window_size)?;
        validate_history_window(self.history_window)
    }
}

/// Compares the mean of the last `window_size` values with the mean of the
/// `window_size` values right before them.
///
/// Best effort: too few points or a non-positive baseline window simply yield
/// no change point. Shifts in either direction are reported once their
/// magnitude reaches `min_delta_pct`; at most one change point is returned.
///
/// # Errors
///
/// Returns error only for invalid `params`.
pub fn detect_change_points(
    values: &[f64],
    metric_name: &str,
    params: &ChangePointParams,
) -> Result<Vec<ChangePoint>> {
    params.validate()?;

    let window_size = params.window_size;
    let considered = tail(values, params.history_window);
    if considered.len() < 2 * window_size {
        return Ok(Vec::new());
    }

    let recent_start = considered.len() - window_size;
    let baseline = mean(&considered[recent_start - window_size..recent_start]);
    let recent = mean(&considered[recent_start..]);

    if baseline <= 0.0 {
        return Ok(Vec::new());
    }

    let delta_pct = (recent - baseline) / baseline;
    if delta_pct.abs() < params.min_delta_pct {
        return Ok(Vec::new());
    }

    debug!("{metric_name}: window mean moved {baseline} -> {recent} ({delta_pct:+.3})");
    Ok(vec![ChangePoint {
        metric_name: metric_name.to_string(),
        baseline,
        recent,
        delta_pct,
        window_size,
    }])
}
