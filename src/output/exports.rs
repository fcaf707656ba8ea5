use anyhow::Result;
use std::fmt::Write as _;
use std::io::Write;

use crate::config::OutputFormat;
use crate::insights::{AnalysisResult, ChangePoint, Reason, Regression};

use super::summary::render_summary;

/// Exports an analysis result to a machine- or PR-friendly format.
///
/// - Summary: the colored terminal tables
/// - JSON: stable field names for dashboards and bots
/// - Markdown: pull-request comment body
pub fn export_result(
    result: &AnalysisResult,
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Summary => {
            writeln!(output, "{}", render_summary(result))?;
            Ok(())
        }
        OutputFormat::Json => export_json(result, pretty, output),
        OutputFormat::Markdown => {
            writeln!(output, "{}", render_markdown_report(result))?;
            Ok(())
        }
    }
}

fn export_json(result: &AnalysisResult, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    writeln!(output, "{}", json)?;
    Ok(())
}

fn push_regressions(lines: &mut String, regressions: &[Regression]) {
    for regression in regressions {
        let _ = writeln!(
            lines,
            "- {}: {:.1}s vs {:.1}s ({:+.1}%)",
            regression.metric_name,
            regression.current,
            regression.baseline,
            regression.delta_pct * 100.0
        );
    }
}

fn push_named_section(
    lines: &mut String,
    title: &str,
    regressions: &[Regression],
    reason: Option<Reason>,
    data_missing: bool,
) {
    if regressions.is_empty() && reason.is_none() {
        return;
    }

    let _ = writeln!(lines, "\n## {title}");
    if regressions.is_empty() {
        if data_missing {
            let _ = writeln!(lines, "- No samples recorded");
        } else if let Some(reason) = reason {
            let _ = writeln!(lines, "- Reason: {reason}");
        }
    } else {
        push_regressions(lines, regressions);
    }
}

fn push_change_points(lines: &mut String, kind: &str, change_points: &[ChangePoint]) {
    for cp in change_points {
        let _ = writeln!(
            lines,
            "- {kind} {}: {:.1}s -> {:.1}s ({:+.1}%, window {})",
            cp.metric_name,
            cp.baseline,
            cp.recent,
            cp.delta_pct * 100.0,
            cp.window_size
        );
    }
}

/// Renders a Markdown report suitable for a pull-request comment.
pub fn render_markdown_report(result: &AnalysisResult) -> String {
    let mut lines = format!("# CI Report for {}\n\n", result.repo);

    if result.regressions.is_empty() {
        lines.push_str("## No regressions detected\n");
        if let Some(reason) = result.reason {
            let _ = writeln!(lines, "- Reason: {reason}");
        }
    } else {
        lines.push_str("## Regressions\n");
        push_regressions(&mut lines, &result.regressions);
    }

    push_named_section(
        &mut lines,
        "Step regressions",
        &result.step_regressions,
        result.step_reason,
        result.step_data_missing,
    );
    push_named_section(
        &mut lines,
        "Test regressions",
        &result.test_regressions,
        result.test_reason,
        result.test_data_missing,
    );

    if !result.step_change_points.is_empty() || !result.test_change_points.is_empty() {
        lines.push_str("\n## Change points\n");
        push_change_points(&mut lines, "step", &result.step_change_points);
        push_change_points(&mut lines, "test", &result.test_change_points);
    }

    if !result.flakes.is_empty() {
        lines.push_str("\n## Flaky tests\n");
        for flake in &result.flakes {
            let _ = writeln!(
                lines,
                "- {}: {}/{} runs failed ({:.1}%)",
                flake.test_name,
                flake.failures,
                flake.total_runs,
                flake.fail_rate * 100.0
            );
        }
    }

    lines.trim_end().to_string()
}
