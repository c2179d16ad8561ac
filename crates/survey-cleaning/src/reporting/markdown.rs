//! Markdown rendering of a [`CleaningReport`].

use crate::types::{CleaningReport, Detector};
use std::fmt::{self, Write};

/// Render `report` as a Markdown document.
///
/// Warnings and Errors sections appear only when they have entries.
pub fn render_markdown(report: &CleaningReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_markdown(&mut out, report);
    out
}

fn write_markdown(out: &mut impl Write, report: &CleaningReport) -> fmt::Result {
    writeln!(out, "# Data Cleaning Report")?;
    writeln!(out)?;
    writeln!(
        out,
        "Generated: {}",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out, "Mode: {}", report.settings.mode.as_str())?;
    writeln!(out)?;

    write_summary(out, report)?;
    write_issues(out, report)?;
    write_actions(out, report)?;
    write_list(out, "Warnings", &report.warnings)?;
    write_list(out, "Errors", &report.errors)?;

    writeln!(out, "---")?;
    write!(out, "*Execution time: {}ms*", report.execution_time_ms)
}

fn write_summary(out: &mut impl Write, report: &CleaningReport) -> fmt::Result {
    let s = &report.summary;
    writeln!(out, "## Summary")?;
    writeln!(out)?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|---|---|")?;
    writeln!(out, "| Original rows | {} |", s.original_rows)?;
    writeln!(out, "| Final rows | {} |", s.final_rows)?;
    writeln!(
        out,
        "| Rows removed | {} ({:.1}%) |",
        s.rows_removed,
        s.rows_removed_percentage()
    )?;
    writeln!(out, "| Rows flagged | {} |", s.rows_flagged)?;
    writeln!(out, "| Columns | {} -> {} |", s.original_columns, s.final_columns)?;
    writeln!(out, "| Values imputed | {} |", s.values_imputed)?;
    if !s.columns_modified.is_empty() {
        writeln!(out, "| Columns modified | {} |", s.columns_modified.join(", "))?;
    }
    writeln!(out)
}

fn write_issues(out: &mut impl Write, report: &CleaningReport) -> fmt::Result {
    writeln!(out, "## Issues Detected")?;
    writeln!(out)?;
    if report.issues.is_empty() {
        writeln!(out, "No issues detected.")?;
    } else {
        for detector in Detector::ALL {
            writeln!(
                out,
                "- **{}**: {}",
                detector.display_name(),
                report.issues.count(detector)
            )?;
        }
    }
    writeln!(out)
}

fn write_actions(out: &mut impl Write, report: &CleaningReport) -> fmt::Result {
    writeln!(out, "## Actions Applied")?;
    writeln!(out)?;
    if report.actions.is_empty() {
        writeln!(out, "No actions applied.")?;
    } else {
        for (i, action) in report.actions.iter().enumerate() {
            writeln!(
                out,
                "{}. **{}**: {}",
                i + 1,
                action.action_type.display_name(),
                action.description
            )?;
        }
    }
    writeln!(out)
}

/// A bulleted section, skipped when `entries` is empty.
fn write_list(out: &mut impl Write, title: &str, entries: &[String]) -> fmt::Result {
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(out, "## {}", title)?;
    writeln!(out)?;
    for entry in entries {
        writeln!(out, "- {}", entry)?;
    }
    writeln!(out)
}
