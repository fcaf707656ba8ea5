use std::fmt::Write;

use comfy_table::Cell;

use crate::insights::{AnalysisResult, ChangePoint, Reason, Regression};

use super::styling::{finding_count, healthy, heading, highlight, label, warning};
use super::tables::{color_coded_delta_cell, color_coded_fail_rate_cell, create_table, seconds_cell};

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", heading(emoji), heading(title).underlined());
}

fn describe_empty(reason: Option<Reason>, data_missing: bool) -> String {
    match reason {
        _ if data_missing => label("No samples recorded.").to_string(),
        Some(reason) => warning(format!("Inconclusive: {reason}")).to_string(),
        None => healthy("No regressions detected.").to_string(),
    }
}

fn regression_table(regressions: &[Regression]) -> String {
    let mut table = create_table(&["#", "Metric", "Baseline", "Current", "Change"]);
    for (idx, regression) in regressions.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(&regression.metric_name),
            seconds_cell(regression.baseline),
            seconds_cell(regression.current),
            color_coded_delta_cell(regression.delta_pct),
        ]);
    }
    table.to_string()
}

fn change_point_rows<'a>(
    kind: &'a str,
    change_points: &'a [ChangePoint],
) -> impl Iterator<Item = Vec<Cell>> + 'a {
    change_points.iter().map(move |cp| {
        vec![
            Cell::new(kind),
            Cell::new(&cp.metric_name),
            seconds_cell(cp.baseline),
            seconds_cell(cp.recent),
            color_coded_delta_cell(cp.delta_pct),
            Cell::new(cp.window_size),
        ]
    })
}

fn render_regressions(
    output: &mut String,
    emoji: &str,
    title: &str,
    regressions: &[Regression],
    reason: Option<Reason>,
    data_missing: bool,
) {
    add_section_header(output, emoji, title);
    if regressions.is_empty() {
        let _ = writeln!(output, "  {}\n", describe_empty(reason, data_missing));
    } else {
        let _ = writeln!(output, "{}\n", regression_table(regressions));
    }
}

/// Renders a human-readable summary of an analysis.
///
/// Displays color-coded tables for:
/// - Run duration regressions
/// - Step and test duration regressions
/// - Change points across steps and tests
/// - Flaky tests, most unreliable first
///
/// Sections without findings show why nothing was found when the detector
/// could not decide.
pub(super) fn render_summary(result: &AnalysisResult) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Overview");
    let total_regressions =
        result.regressions.len() + result.step_regressions.len() + result.test_regressions.len();
    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n",
        label("Repository:"),
        highlight(&result.repo),
        label("Status:"),
        if result.has_findings() {
            warning("findings")
        } else {
            healthy("clean")
        },
        label("Regressions:"),
        finding_count(total_regressions),
        label("Change points:"),
        finding_count(result.step_change_points.len() + result.test_change_points.len()),
        label("Flaky tests:"),
        finding_count(result.flakes.len()),
    );

    render_regressions(
        &mut output,
        "⏱️",
        "Run Duration",
        &result.regressions,
        result.reason,
        false,
    );
    render_regressions(
        &mut output,
        "🧱",
        "Step Regressions",
        &result.step_regressions,
        result.step_reason,
        result.step_data_missing,
    );
    render_regressions(
        &mut output,
        "🧪",
        "Test Regressions",
        &result.test_regressions,
        result.test_reason,
        result.test_data_missing,
    );

    add_section_header(&mut output, "📈", "Change Points");
    if result.step_change_points.is_empty() && result.test_change_points.is_empty() {
        let _ = writeln!(output, "  {}\n", label("No sustained shifts."));
    } else {
        let mut table = create_table(&["Kind", "Metric", "Before", "Recent", "Change", "Window"]);
        for row in change_point_rows("step", &result.step_change_points)
            .chain(change_point_rows("test", &result.test_change_points))
        {
            table.add_row(row);
        }
        let _ = writeln!(output, "{table}\n");
    }

    add_section_header(&mut output, "🔄", "Flaky Tests");
    if result.flakes.is_empty() {
        let _ = writeln!(output, "  {}", healthy("No flaky tests."));
    } else {
        let mut table = create_table(&["#", "Test", "Fail Rate", "Failures", "Runs"]);
        for (idx, flake) in result.flakes.iter().enumerate() {
            table.add_row(vec![
                Cell::new(idx + 1),
                Cell::new(&flake.test_name),
                color_coded_fail_rate_cell(flake.fail_rate),
                Cell::new(flake.failures),
                Cell::new(flake.total_runs),
            ]);
        }
        let _ = writeln!(output, "{table}");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::Flake;

    fn empty_result() -> AnalysisResult {
        AnalysisResult {
            repo: "acme/widgets".to_string(),
            regressions: vec![],
            reason: Some(Reason::InsufficientHistory),
            step_regressions: vec![],
            test_regressions: vec![],
            step_reason: Some(Reason::InsufficientHistory),
            test_reason: None,
            step_change_points: vec![],
            test_change_points: vec![],
            flakes: vec![],
            step_data_missing: true,
            test_data_missing: false,
        }
    }

    #[test]
    fn explains_empty_sections() {
        let rendered = console::strip_ansi_codes(&render_summary(&empty_result())).to_string();

        assert!(rendered.contains("acme/widgets"));
        assert!(rendered.contains("Status: clean"));
        assert!(rendered.contains("Inconclusive: insufficient_history"));
        assert!(rendered.contains("No samples recorded."));
        assert!(rendered.contains("No regressions detected."));
        assert!(rendered.contains("No flaky tests."));
    }

    #[test]
    fn lists_findings() {
        let mut result = empty_result();
        result.step_regressions.push(Regression {
            metric_name: "compile".to_string(),
            baseline: 10.0,
            current: 20.0,
            delta_pct: 1.0,
        });
        result.test_change_points.push(ChangePoint {
            metric_name: "suite::slow".to_string(),
            baseline: 1.0,
            recent: 2.0,
            delta_pct: 1.0,
            window_size: 3,
        });
        result.flakes.push(Flake {
            test_name: "suite::flaky".to_string(),
            fail_rate: 0.4,
            failures: 2,
            total_runs: 5,
        });

        let rendered = console::strip_ansi_codes(&render_summary(&result)).to_string();

        assert!(rendered.contains("Status: findings"));
        assert!(rendered.contains("compile"));
        assert!(rendered.contains("+100.0%"));
        assert!(rendered.contains("suite::slow"));
        assert!(rendered.contains("suite::flaky"));
        assert!(rendered.contains("40.0%"));
    }
}
