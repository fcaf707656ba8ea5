use indexmap::IndexMap;
use log::debug;

use super::change_points::{detect_change_points, ChangePointParams};
use super::regression::{detect_regressions, RegressionParams};
use crate::error::Result;
use crate::insights::{ChangePoint, DetectionResult, Reason, Regression};
use crate::samples::NamedDurationSample;

/// Duration series per name, in first-seen name order, each sorted by run number.
fn group_durations_by_name(samples: &[NamedDurationSample]) -> IndexMap<&str, Vec<f64>> {
    let mut grouped: IndexMap<&str, Vec<(u64, f64)>> = IndexMap::new();
    for sample in samples {
        grouped
            .entry(sample.name.as_str())
            .or_default()
            .push((sample.run_number, sample.duration_seconds));
    }

    grouped
        .into_iter()
        .map(|(name, mut entries)| {
            entries.sort_by_key(|(run_number, _)| *run_number);
            (name, entries.into_iter().map(|(_, duration)| duration).collect())
        })
        .collect()
}

/// Runs the regression detector over every named step or test.
///
/// The aggregate reason is `insufficient_history` when there are no samples
/// at all, or when no single name had enough history to be judged. Per-name
/// reasons such as a non-positive baseline are not surfaced.
///
/// # Errors
///
/// Returns error only for invalid `params`.
pub fn detect_named_regressions(
    samples: &[NamedDurationSample],
    params: &RegressionParams,
) -> Result<DetectionResult> {
    params.validate()?;

    if samples.is_empty() {
        return Ok(DetectionResult::with_reason(Reason::InsufficientHistory));
    }

    let grouped = group_durations_by_name(samples);
    let mut regressions: Vec<Regression> = Vec::new();
    let mut any_evaluated = false;

    for (name, durations) in &grouped {
        any_evaluated |= params.has_enough_history(durations);
        let detection = detect_regressions(durations, name, params)?;
        regressions.extend(detection.regressions);
    }

    debug!(
        "{} regressions across {} names (evaluated: {any_evaluated})",
        regressions.len(),
        grouped.len()
    );

    let reason = if regressions.is_empty() && !any_evaluated {
        Some(Reason::InsufficientHistory)
    } else {
        None
    };

    Ok(DetectionResult {
        regressions,
        reason,
    })
}

/// Runs the change-point detector over every named step or test.
///
/// # Errors
///
/// Returns error only for invalid `params`.
pub fn detect_named_change_points(
    samples: &[NamedDurationSample],
    params: &ChangePointParams,
) -> Result<Vec<ChangePoint>> {
    params.validate()?;

    let mut change_points = Vec::new();
    for (name, durations) in &group_durations_by_name(samples) {
        change_points.extend(detect_change_points(durations, name, params)?);
    }

    Ok(change_points)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn sample(run_number: u64, name: &str, duration: f64) -> NamedDurationSample {
        NamedDurationSample::new(run_number, name, duration)
    }

    #[cfg(test)]
    mod group_durations_by_name {
        use super::*;

        #[test]
        fn returns_empty_map_for_no_samples() {
            assert!(group_durations_by_name(&[]).is_empty());
        }

        #[test]
        fn sorts_each_group_by_run_number() {
            let samples = vec![
                sample(3, "build", 30.0),
                sample(1, "build", 10.0),
                sample(2, "lint", 5.0),
                sample(2, "build", 20.0),
            ];
            let grouped = group_durations_by_name(&samples);

            assert_eq!(grouped.len(), 2, "Should have two groups");
            assert_eq!(grouped["build"], vec![10.0, 20.0, 30.0]);
            assert_eq!(grouped["lint"], vec![5.0]);
        }

        #[test]
        fn keeps_first_seen_name_order() {
            let samples = vec![
                sample(1, "zeta", 1.0),
                sample(1, "alpha", 1.0),
                sample(2, "zeta", 1.0),
            ];
            let names: Vec<&str> = group_durations_by_name(&samples).keys().copied().collect();

            assert_eq!(names, vec!["zeta", "alpha"]);
        }
    }

    #[cfg(test)]
    mod detect_named_regressions {
        use super::*;

        #[test]
        fn empty_input_is_insufficient_history() {
            let result = detect_named_regressions(&[], &RegressionParams::default()).unwrap();
            assert_eq!(result, DetectionResult::with_reason(Reason::InsufficientHistory));
        }

        #[test]
        fn tags_findings_with_sample_name() {
            let samples = vec![
                sample(1, "compile", 10.0),
                sample(2, "compile", 10.0),
                sample(3, "compile", 20.0),
                sample(1, "lint", 5.0),
                sample(2, "lint", 5.0),
                sample(3, "lint", 5.0),
            ];
            let result = detect_named_regressions(&samples, &RegressionParams::default()).unwrap();

            assert_eq!(
                result.regressions,
                vec![Regression {
                    metric_name: "compile".to_string(),
                    baseline: 10.0,
                    current: 20.0,
                    delta_pct: 1.0,
                }]
            );
            assert_eq!(result.reason, None);
        }

        #[test]
        fn history_without_regression_has_no_reason() {
            let samples = vec![
                sample(1, "suite::case", 1.0),
                sample(2, "suite::case", 1.0),
                sample(3, "suite::case", 1.05),
            ];
            let result = detect_named_regressions(&samples, &RegressionParams::default()).unwrap();

            assert!(result.regressions.is_empty());
            assert_eq!(result.reason, None, "History existed, nothing regressed");
        }

        #[test]
        fn single_sample_per_name_is_insufficient_history() {
            let samples = vec![sample(1, "build", 10.0), sample(1, "test", 20.0)];
            let result = detect_named_regressions(&samples, &RegressionParams::default()).unwrap();

            assert_eq!(result, DetectionResult::with_reason(Reason::InsufficientHistory));
        }

        #[test]
        fn one_evaluable_group_clears_the_reason() {
            let samples = vec![
                sample(1, "new-step", 10.0),
                sample(1, "old-step", 10.0),
                sample(2, "old-step", 10.0),
            ];
            let result = detect_named_regressions(&samples, &RegressionParams::default()).unwrap();

            assert_eq!(result, DetectionResult::default());
        }

        #[test]
        fn respects_min_history_per_group() {
            let samples = vec![
                sample(1, "build", 10.0),
                sample(2, "build", 10.0),
                sample(3, "build", 40.0),
            ];
            let params = RegressionParams {
                min_history: 3,
                ..RegressionParams::default()
            };
            let result = detect_named_regressions(&samples, &params).unwrap();

            assert_eq!(result, DetectionResult::with_reason(Reason::InsufficientHistory));
        }

        #[test]
        fn uses_run_number_not_input_order() {
            let samples = vec![
                sample(3, "build", 10.0),
                sample(1, "build", 10.0),
                sample(4, "build", 10.0),
                sample(2, "build", 30.0),
            ];
            let result = detect_named_regressions(&samples, &RegressionParams::default()).unwrap();

            assert!(
                result.regressions.is_empty(),
                "Run 4 is current and matches the baseline"
            );
        }
    }

    #[cfg(test)]
    mod detect_named_change_points {
        use super::*;

        #[test]
        fn reports_change_per_name() {
            let mut samples = Vec::new();
            for run in 1..=6 {
                let shifted = if run > 3 { 20.0 } else { 10.0 };
                samples.push(sample(run, "integration", shifted));
                samples.push(sample(run, "unit", 10.0));
            }
            let params = ChangePointParams {
                min_delta_pct: 0.5,
                ..ChangePointParams::default()
            };
            let result = detect_named_change_points(&samples, &params).unwrap();

            assert_eq!(result.len(), 1);
            assert_eq!(result[0].metric_name, "integration");
            assert_eq!(result[0].baseline, 10.0);
            assert_eq!(result[0].recent, 20.0);
            assert_eq!(result[0].delta_pct, 1.0);
        }

        #[test]
        fn empty_input_yields_nothing() {
            let result = detect_named_change_points(&[], &ChangePointParams::default()).unwrap();
            assert!(result.is_empty());
        }
    }
}
