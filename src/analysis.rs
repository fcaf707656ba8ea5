use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::detection::{
    detect_flakes, detect_named_change_points, detect_named_regressions, detect_regressions,
    ChangePointParams, FlakeParams, RegressionParams,
};
use crate::error::Result;
use crate::insights::{AnalysisResult, DetectionResult, Reason, METRIC_RUN_DURATION_SECONDS};
use crate::samples::{RepoHistory, Run, SampleProvider};
use crate::time_utils::duration_seconds;

/// Detector settings for one repository analysis.
///
/// Run, step and test durations each carry their own regression settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalysisParams {
    #[serde(default)]
    pub runs: RegressionParams,
    #[serde(default)]
    pub steps: RegressionParams,
    #[serde(default)]
    pub tests: RegressionParams,
    #[serde(default)]
    pub change_points: ChangePointParams,
    #[serde(default)]
    pub flakes: FlakeParams,
}

impl AnalysisParams {
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.runs.validate()?;
        self.steps.validate()?;
        self.tests.validate()?;
        self.change_points.validate()?;
        self.flakes.validate()
    }
}

/// Wall-clock duration of every run, ordered by run number.
///
/// # Errors
///
/// Returns error if any run carries a timestamp that cannot be parsed.
pub fn run_durations(runs: &[Run]) -> Result<Vec<f64>> {
    let mut ordered: Vec<&Run> = runs.iter().collect();
    ordered.sort_by_key(|run| run.run_number);

    ordered
        .into_iter()
        .map(|run| duration_seconds(&run.created_at, &run.updated_at))
        .collect()
}

/// Analyzes a repository's full history in one pass.
///
/// Every detector runs regardless of what the others found. Runs whose
/// timestamps cannot be resolved leave the run-duration series undecidable
/// (`insufficient_history`) without affecting the other detectors.
///
/// # Errors
///
/// Returns error for invalid `params`, checked before any detector runs.
pub fn analyze_history(history: &RepoHistory, params: &AnalysisParams) -> Result<AnalysisResult> {
    params.validate()?;

    let detection = match run_durations(&history.runs) {
        Ok(durations) => {
            debug!("{}: {} run durations", history.repo, durations.len());
            detect_regressions(&durations, METRIC_RUN_DURATION_SECONDS, &params.runs)?
        }
        Err(err) => {
            warn!("{}: skipping run duration analysis: {}", history.repo, err);
            DetectionResult::with_reason(Reason::InsufficientHistory)
        }
    };
    let step_detection = detect_named_regressions(&history.step_durations, &params.steps)?;
    let test_detection = detect_named_regressions(&history.test_durations, &params.tests)?;
    let step_change_points =
        detect_named_change_points(&history.step_durations, &params.change_points)?;
    let test_change_points =
        detect_named_change_points(&history.test_durations, &params.change_points)?;
    let flakes = detect_flakes(&history.test_outcomes, &params.flakes)?;

    let result = AnalysisResult {
        repo: history.repo.clone(),
        regressions: detection.regressions,
        reason: detection.reason,
        step_regressions: step_detection.regressions,
        test_regressions: test_detection.regressions,
        step_reason: step_detection.reason,
        test_reason: test_detection.reason,
        step_change_points,
        test_change_points,
        flakes,
        step_data_missing: history.step_durations.is_empty(),
        test_data_missing: history.test_durations.is_empty(),
    };

    info!(
        "Analyzed {}: {} run, {} step, {} test regressions; {} change points; {} flakes",
        result.repo,
        result.regressions.len(),
        result.step_regressions.len(),
        result.test_regressions.len(),
        result.step_change_points.len() + result.test_change_points.len(),
        result.flakes.len()
    );

    Ok(result)
}

/// Pulls a repository's history from `provider` and analyzes it.
///
/// # Errors
///
/// Returns provider errors or invalid `params`.
pub fn analyze_repo<P: SampleProvider + ?Sized>(
    provider: &P,
    repo: &str,
    params: &AnalysisParams,
) -> Result<AnalysisResult> {
    params.validate()?;

    let history = RepoHistory {
        repo: repo.to_string(),
        runs: provider.runs(repo)?,
        step_durations: provider.step_durations(repo)?,
        test_durations: provider.test_durations(repo)?,
        test_outcomes: provider.test_outcomes(repo)?,
    };

    analyze_history(&history, params)
}
