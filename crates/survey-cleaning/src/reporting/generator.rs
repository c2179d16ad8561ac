use crate::config::CleaningSettings;
use crate::detectors::merge_duplicate_groups;
use crate::error::{Result, ResultExt};
use crate::reporting::render_markdown;
use crate::types::{ActionType, CleaningAction, CleaningReport, CleaningSummary, DetectedIssues};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Output format for an exported report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }
}

/// Everything the generator needs from a finished run.
pub struct ReportParams {
    pub original_rows: usize,
    pub original_columns: usize,
    pub final_rows: usize,
    pub final_columns: usize,
    pub issues: DetectedIssues,
    pub actions: Vec<CleaningAction>,
    pub settings: CleaningSettings,
    /// When the run started; used for `execution_time_ms`.
    pub started: Instant,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

pub struct ReportGenerator;

impl ReportGenerator {
    /// Assemble the report for a run.
    ///
    /// Duplicate pairs are regrouped so the report lists one entry per group.
    pub fn generate(params: ReportParams) -> CleaningReport {
        let ReportParams {
            original_rows,
            original_columns,
            final_rows,
            final_columns,
            mut issues,
            actions,
            settings,
            started,
            warnings,
            errors,
        } = params;

        issues.duplicates = merge_duplicate_groups(&issues.duplicates);

        let columns_modified: BTreeSet<String> = actions
            .iter()
            .filter(|a| {
                matches!(
                    a.action_type,
                    ActionType::TextCleaned | ActionType::ValuesImputed | ActionType::OutliersCapped
                )
            })
            .flat_map(|a| a.affected.columns.iter().cloned())
            .collect();

        let values_imputed = actions
            .iter()
            .filter(|a| a.action_type == ActionType::ValuesImputed)
            .map(|a| a.affected.count)
            .sum();

        let summary = CleaningSummary {
            original_rows,
            original_columns,
            final_rows,
            final_columns,
            rows_removed: original_rows.saturating_sub(final_rows),
            rows_flagged: issues.flagged_rows().len(),
            columns_modified: columns_modified.into_iter().collect(),
            values_imputed,
        };

        CleaningReport {
            timestamp: Utc::now(),
            settings,
            summary,
            issues,
            actions,
            execution_time_ms: started.elapsed().as_millis() as u64,
            warnings,
            errors,
        }
    }

    pub fn to_json(report: &CleaningReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Write the report to `<dir>/<file_name>-cleaning-report.<ext>`.
    pub fn write_report(
        report: &CleaningReport,
        dir: impl AsRef<Path>,
        file_name: &str,
        format: ReportFormat,
    ) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).context(format!("Failed to create {}", dir.display()))?;

        let contents = match format {
            ReportFormat::Markdown => render_markdown(report),
            ReportFormat::Json => Self::to_json(report)?,
        };

        let report_path = dir.join(format!(
            "{}-cleaning-report.{}",
            file_name,
            format.extension()
        ));
        let mut file = File::create(&report_path)?;
        file.write_all(contents.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}
