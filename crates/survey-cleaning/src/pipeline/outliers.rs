//! Outlier handling module.
//!
//! Applies the configured [`OutlierAction`] to the outliers found on the
//! original dataset, after the row-removal step has run.

use crate::config::OutlierAction;
use crate::dataset::CellValue;
use crate::error::Result;
use crate::pipeline::executor::{RunLog, WorkingSet, distinct_columns};
use crate::stats;
use crate::types::{ActionType, AffectedSummary, CleaningAction, OutlierIssue};
use std::collections::BTreeSet;
use tracing::debug;

/// Percentiles used as winsorizing bounds.
const CAP_LOWER: f64 = 0.05;
const CAP_UPPER: f64 = 0.95;

/// Handles outlier treatment.
pub(crate) struct OutlierHandler;

impl OutlierHandler {
    /// Handle outliers based on the selected action.
    pub fn handle_outliers(
        working: &mut WorkingSet,
        issues: &[OutlierIssue],
        action: OutlierAction,
        log: &mut RunLog,
    ) -> Result<()> {
        if issues.is_empty() {
            return Ok(());
        }
        match action {
            OutlierAction::Remove => Self::remove_outliers(working, issues, log),
            OutlierAction::Cap => Self::cap_outliers(working, issues, log),
            OutlierAction::Flag => {
                log.warning(format!(
                    "{} outliers detected and left in place",
                    issues.len()
                ));
                Ok(())
            }
        }
    }

    fn remove_outliers(
        working: &mut WorkingSet,
        issues: &[OutlierIssue],
        log: &mut RunLog,
    ) -> Result<()> {
        let flagged: BTreeSet<usize> = issues
            .iter()
            .map(|i| i.row_index)
            .filter(|origin| working.contains(*origin))
            .collect();
        let removed = working.remove_origins(&flagged);
        if !removed.is_empty() {
            let count = removed.len();
            log.action(CleaningAction::new(
                ActionType::OutliersRemoved,
                format!("Removed {} rows containing outliers", count),
                AffectedSummary {
                    rows: removed,
                    columns: distinct_columns(issues.iter().map(|i| i.column.as_str())),
                    count,
                },
            ));
        }
        Ok(())
    }

    /// Winsorize each affected column to its 5th/95th percentiles.
    ///
    /// Bounds come from the working copy, so rows removed earlier in the run
    /// do not influence them.
    fn cap_outliers(
        working: &mut WorkingSet,
        issues: &[OutlierIssue],
        log: &mut RunLog,
    ) -> Result<()> {
        for column in distinct_columns(issues.iter().map(|i| i.column.as_str())) {
            working.require_column(&column)?;

            let values: Vec<f64> = working
                .rows
                .iter()
                .filter_map(|row| row.get(&column).as_number())
                .collect();
            let sorted = stats::sort_ascending(&values);
            let (Some(lower), Some(upper)) = (
                stats::rank_quantile(&sorted, CAP_LOWER),
                stats::rank_quantile(&sorted, CAP_UPPER),
            ) else {
                continue;
            };

            let mut capped_rows = Vec::new();
            for (position, row) in working.rows.iter_mut().enumerate() {
                if let Some(value) = row.get(&column).as_number() {
                    let clamped = value.clamp(lower, upper);
                    if clamped != value {
                        row.set(column.clone(), CellValue::Numeric(clamped));
                        capped_rows.push(working.origins[position]);
                    }
                }
            }
            debug!(
                "Capped {} values in '{}' to [{}, {}]",
                capped_rows.len(),
                column,
                lower,
                upper
            );

            if !capped_rows.is_empty() {
                let count = capped_rows.len();
                log.action(CleaningAction::new(
                    ActionType::OutliersCapped,
                    format!(
                        "Capped {} values in '{}' to the 5th-95th percentile range [{}, {}]",
                        count, column, lower, upper
                    ),
                    AffectedSummary {
                        rows: capped_rows,
                        columns: vec![column.clone()],
                        count,
                    },
                ));
            }
        }
        Ok(())
    }
}
