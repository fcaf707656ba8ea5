use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use super::{cmp_f64, tail, validate_at_least_one, validate_history_window};
use crate::error::{HunterError, Result};
use crate::insights::Flake;
use crate::samples::{TestOutcome, TestOutcomeSample};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlakeParams {
    /// Minimum failures / considered runs, in `[0, 1]`
    #[serde(default = "default_min_fail_rate")]
    pub min_fail_rate: f64,

    #[serde(default = "default_min_failures")]
    pub min_failures: usize,

    /// Minimum passed + failed outcomes before a test is judged
    #[serde(default = "default_min_runs")]
    pub min_runs: usize,

    /// Most recent outcomes kept per test, skips included
    #[serde(default)]
    pub history_window: Option<usize>,
}

impl Default for FlakeParams {
    fn default() -> Self {
        Self {
            min_fail_rate: default_min_fail_rate(),
            min_failures: default_min_failures(),
            min_runs: default_min_runs(),
            history_window: None,
        }
    }
}

fn default_min_fail_rate() -> f64 {
    0.2
}

fn default_min_failures() -> usize {
    2
}

fn default_min_runs() -> usize {
    5
}

impl FlakeParams {
    /// # Errors
    ///
    /// Returns error if `min_fail_rate` is outside `[0, 1]` or any count is zero.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_fail_rate) {
            return Err(HunterError::invalid(
                "min_fail_rate",
                format!("must be in [0, 1], got {}", self.min_fail_rate),
            ));
        }
        validate_at_least_one("min_failures", self.min_failures)?;
        validate_at_least_one("min_runs", self.min_runs)?;
        validate_history_window(self.history_window)
    }
}

/// Finds tests that intermittently fail.
///
/// Tests that never pass within the considered outcomes are deterministic
/// failures and are not reported. Results are ordered by fail rate and
/// failure count (both descending), then by test name.
///
/// # Errors
///
/// Returns error only for invalid `params`.
pub fn detect_flakes(samples: &[TestOutcomeSample], params: &FlakeParams) -> Result<Vec<Flake>> {
    params.validate()?;

    let mut flakes: Vec<Flake> = group_outcomes_by_test(samples)
        .into_iter()
        .filter_map(|(test_name, outcomes)| evaluate_test(test_name, &outcomes, params))
        .collect();

    flakes.sort_by(|a, b| {
        cmp_f64(b.fail_rate, a.fail_rate)
            .then_with(|| b.failures.cmp(&a.failures))
            .then_with(|| a.test_name.cmp(&b.test_name))
    });

    Ok(flakes)
}

/// Outcomes per test, each ordered by run number.
fn group_outcomes_by_test(samples: &[TestOutcomeSample]) -> IndexMap<&str, Vec<TestOutcome>> {
    let mut grouped: IndexMap<&str, Vec<(u64, TestOutcome)>> = IndexMap::new();
    for sample in samples {
        grouped
            .entry(sample.test_name.as_str())
            .or_default()
            .push((sample.run_number, sample.outcome));
    }

    grouped
        .into_iter()
        .map(|(name, mut entries)| {
            entries.sort_by_key(|(run_number, _)| *run_number);
            (name, entries.into_iter().map(|(_, outcome)| outcome).collect())
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn evaluate_test(test_name: &str, outcomes: &[TestOutcome], params: &FlakeParams) -> Option<Flake> {
    let considered: Vec<TestOutcome> = tail(outcomes, params.history_window)
        .iter()
        .copied()
        .filter(|outcome| *outcome != TestOutcome::Skipped)
        .collect();

    let total_runs = considered.len();
    if total_runs < params.min_runs {
        return None;
    }

    let failures = considered
        .iter()
        .filter(|outcome| **outcome == TestOutcome::Failed)
        .count();
    if failures < params.min_failures {
        return None;
    }

    if failures == total_runs {
        debug!("{test_name}: failed all {total_runs} runs, not flaky");
        return None;
    }

    let fail_rate = failures as f64 / total_runs as f64;
    if fail_rate < params.min_fail_rate {
        return None;
    }

    Some(Flake {
        test_name: test_name.to_string(),
        fail_rate,
        failures,
        total_runs,
    })
}
