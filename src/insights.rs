use std::fmt;

use serde::{Deserialize, Serialize};

/// Metric name used for the repository-level wall-clock duration series.
pub const METRIC_RUN_DURATION_SECONDS: &str = "run_duration_seconds";

/// Why a detector produced no findings when it could not evaluate the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    InsufficientHistory,
    NonPositiveBaseline,
}

impl Reason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientHistory => "insufficient_history",
            Self::NonPositiveBaseline => "non_positive_baseline",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The latest observation of a metric exceeded its historical baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regression {
    pub metric_name: String,
    pub baseline: f64,
    pub current: f64,
    /// `(current - baseline) / baseline`
    pub delta_pct: f64,
}

/// A sustained shift between the two most recent windows of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    pub metric_name: String,
    /// Mean of the window preceding the recent one
    pub baseline: f64,
    /// Mean of the most recent window
    pub recent: f64,
    pub delta_pct: f64,
    pub window_size: usize,
}

/// A test that both passes and fails often enough to be called intermittent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flake {
    pub test_name: String,
    pub fail_rate: f64,
    pub failures: usize,
    /// Passed and failed outcomes considered; skips are excluded
    pub total_runs: usize,
}

/// Findings of a single regression pass plus the reason nothing was found.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    pub regressions: Vec<Regression>,
    pub reason: Option<Reason>,
}

impl DetectionResult {
    pub(crate) fn with_reason(reason: Reason) -> Self {
        Self {
            regressions: Vec::new(),
            reason: Some(reason),
        }
    }
}

/// Everything detected for one repository.
///
/// Field names are part of the JSON report contract and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub repo: String,
    pub regressions: Vec<Regression>,
    pub reason: Option<Reason>,
    pub step_regressions: Vec<Regression>,
    pub test_regressions: Vec<Regression>,
    pub step_reason: Option<Reason>,
    pub test_reason: Option<Reason>,
    pub step_change_points: Vec<ChangePoint>,
    pub test_change_points: Vec<ChangePoint>,
    pub flakes: Vec<Flake>,
    pub step_data_missing: bool,
    pub test_data_missing: bool,
}

impl AnalysisResult {
    pub fn has_findings(&self) -> bool {
        !self.regressions.is_empty()
            || !self.step_regressions.is_empty()
            || !self.test_regressions.is_empty()
            || !self.step_change_points.is_empty()
            || !self.test_change_points.is_empty()
            || !self.flakes.is_empty()
    }
}
