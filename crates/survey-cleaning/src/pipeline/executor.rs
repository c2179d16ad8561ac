//! Remediation executor.
//!
//! Applies the text, missing-data and row-removal steps to a [`WorkingSet`],
//! recording one [`CleaningAction`] per mutation in a [`RunLog`].

use crate::cleaner::TextSanitizer;
use crate::config::{
    DuplicateSettings, KeepStrategy, MissingDataSettings, MissingDataStrategy, TextQualitySettings,
};
use crate::dataset::{CellValue, Column, ColumnType, Dataset, Row};
use crate::detectors::merge_duplicate_groups;
use crate::error::{CleaningError, Result};
use crate::imputers::StatisticalImputer;
use crate::types::{ActionType, AffectedSummary, CleaningAction, DetectedIssues, MissingDataIssue};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// Mutable copy of the dataset being cleaned.
///
/// `origins[i]` is the index in the original dataset of working row `i`.
/// Rows are only ever removed, never reordered, so `origins` stays sorted.
#[derive(Debug, Clone)]
pub(crate) struct WorkingSet {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub origins: Vec<usize>,
}

impl WorkingSet {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            columns: dataset.columns().to_vec(),
            rows: dataset.rows().to_vec(),
            origins: (0..dataset.row_count()).collect(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn contains(&self, origin: usize) -> bool {
        self.origins.binary_search(&origin).is_ok()
    }

    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CleaningError::ColumnNotFound(name.to_string()))
    }

    /// Drop every row whose origin is in `remove`. Returns the removed origins in order.
    pub fn remove_origins(&mut self, remove: &BTreeSet<usize>) -> Vec<usize> {
        let mut removed = Vec::new();
        let mut kept_rows = Vec::with_capacity(self.rows.len());
        let mut kept_origins = Vec::with_capacity(self.origins.len());
        for (row, origin) in self.rows.drain(..).zip(self.origins.drain(..)) {
            if remove.contains(&origin) {
                removed.push(origin);
            } else {
                kept_rows.push(row);
                kept_origins.push(origin);
            }
        }
        self.rows = kept_rows;
        self.origins = kept_origins;
        removed
    }

    pub fn into_dataset(self) -> Dataset {
        Dataset::from_parts_unchecked(self.columns, self.rows)
    }
}

/// Actions, warnings and errors accumulated over one run.
#[derive(Debug, Default)]
pub(crate) struct RunLog {
    pub actions: Vec<CleaningAction>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl RunLog {
    pub fn action(&mut self, action: CleaningAction) {
        debug!("{}: {}", action.action_type.display_name(), action.description);
        self.actions.push(action);
    }

    pub fn warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Record a failed step; the run continues.
    pub fn step_failed(&mut self, step: &str, error: CleaningError) {
        let error = CleaningError::RemediationFailed {
            step: step.to_string(),
            reason: error.to_string(),
        };
        warn!("{}", error);
        self.errors.push(error.to_string());
    }
}

/// Executes remediation steps on the working copy.
pub(crate) struct RemediationExecutor;

impl RemediationExecutor {
    /// Normalize every text column. Emits one aggregate action when any row changed.
    pub fn clean_text(
        working: &mut WorkingSet,
        settings: &TextQualitySettings,
        log: &mut RunLog,
    ) -> Result<()> {
        let sanitizer = TextSanitizer::from_settings(settings);
        if !settings.enabled || !sanitizer.is_active() {
            return Ok(());
        }

        let text_columns: Vec<String> = working
            .columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Text)
            .map(|c| c.name.clone())
            .collect();

        let mut changed_rows = BTreeSet::new();
        let mut changed_columns = BTreeSet::new();
        for (position, row) in working.rows.iter_mut().enumerate() {
            for column in &text_columns {
                if let Some(cleaned) = sanitizer.clean_cell(row.get(column)) {
                    row.set(column.clone(), cleaned);
                    changed_rows.insert(working.origins[position]);
                    changed_columns.insert(column.clone());
                }
            }
        }

        if !changed_rows.is_empty() {
            let count = changed_rows.len();
            log.action(CleaningAction::new(
                ActionType::TextCleaned,
                format!("Cleaned text in {} rows", count),
                AffectedSummary {
                    rows: changed_rows.into_iter().collect(),
                    columns: changed_columns.into_iter().collect(),
                    count,
                },
            ));
        }
        Ok(())
    }

    /// Impute or remove missing values in each flagged column, one action per column.
    pub fn handle_missing(
        working: &mut WorkingSet,
        issues: &[MissingDataIssue],
        settings: &MissingDataSettings,
        log: &mut RunLog,
    ) -> Result<()> {
        if settings.strategy == MissingDataStrategy::Leave {
            return Ok(());
        }

        for issue in issues {
            let column = working.require_column(&issue.column)?.clone();

            if settings.strategy == MissingDataStrategy::Remove {
                let remove: BTreeSet<usize> = working
                    .rows
                    .iter()
                    .zip(&working.origins)
                    .filter(|(row, _)| row.get(&column.name).is_missing())
                    .map(|(_, origin)| *origin)
                    .collect();
                let removed = working.remove_origins(&remove);
                if !removed.is_empty() {
                    let count = removed.len();
                    log.action(CleaningAction::new(
                        ActionType::RowsRemovedMissing,
                        format!("Removed {} rows missing '{}'", count, column.name),
                        AffectedSummary {
                            rows: removed,
                            columns: vec![column.name.clone()],
                            count,
                        },
                    ));
                }
                continue;
            }

            let Some(fill) =
                StatisticalImputer::fill_value(&working.rows, &column, settings.strategy)
            else {
                log.warning(format!(
                    "Could not impute '{}': no values to compute a fill value from",
                    column.name
                ));
                continue;
            };

            let filled = StatisticalImputer::fill_missing(&mut working.rows, &column.name, &fill);
            if !filled.is_empty() {
                let count = filled.len();
                log.action(CleaningAction::new(
                    ActionType::ValuesImputed,
                    format!(
                        "Imputed {} missing values in '{}' with {}",
                        count,
                        column.name,
                        strategy_label(settings.strategy, &fill)
                    ),
                    AffectedSummary {
                        rows: filled.iter().map(|p| working.origins[*p]).collect(),
                        columns: vec![column.name.clone()],
                        count,
                    },
                ));
            }
        }
        Ok(())
    }

    /// Remove duplicates, speeders and straight-liners in a single pass.
    ///
    /// A row flagged by several categories is attributed to the first one, so
    /// the per-category counts add up to the rows actually removed.
    pub fn remove_flagged_rows(
        working: &mut WorkingSet,
        original: &Dataset,
        issues: &DetectedIssues,
        duplicates: &DuplicateSettings,
        log: &mut RunLog,
    ) -> Result<()> {
        let duplicate_rows = Self::duplicate_removals(working, original, issues, duplicates.keep_strategy);
        let speeder_rows: BTreeSet<usize> = issues.speeders.iter().map(|i| i.row_index).collect();
        let straight_liner_rows: BTreeSet<usize> =
            issues.straight_liners.iter().map(|i| i.row_index).collect();

        let categories = [
            (ActionType::DuplicatesRemoved, "duplicate", duplicate_rows),
            (ActionType::SpeedersRemoved, "speeder", speeder_rows),
            (ActionType::StraightLinersRemoved, "straight-liner", straight_liner_rows),
        ];

        let mut removal_set = BTreeSet::new();
        let mut contributions = Vec::new();
        for (action_type, label, rows) in categories {
            let exclusive: Vec<usize> = rows
                .into_iter()
                .filter(|origin| working.contains(*origin) && !removal_set.contains(origin))
                .collect();
            removal_set.extend(exclusive.iter().copied());
            contributions.push((action_type, label, exclusive));
        }

        if removal_set.is_empty() {
            return Ok(());
        }

        let removed = working.remove_origins(&removal_set);
        info!("Removed {} flagged rows in one pass", removed.len());

        for (action_type, label, rows) in contributions {
            if rows.is_empty() {
                continue;
            }
            let count = rows.len();
            log.action(CleaningAction::new(
                action_type,
                format!("Removed {} {} rows", count, label),
                AffectedSummary {
                    rows,
                    columns: Vec::new(),
                    count,
                },
            ));
        }
        Ok(())
    }

    /// Rows to drop from each duplicate group, keeping one survivor per group.
    fn duplicate_removals(
        working: &WorkingSet,
        original: &Dataset,
        issues: &DetectedIssues,
        keep: KeepStrategy,
    ) -> BTreeSet<usize> {
        let mut remove = BTreeSet::new();
        for group in merge_duplicate_groups(&issues.duplicates) {
            let present: Vec<usize> = group
                .row_indices
                .iter()
                .copied()
                .filter(|origin| working.contains(*origin))
                .collect();
            if present.len() < 2 {
                continue;
            }
            let survivor = match keep {
                KeepStrategy::First => present[0],
                KeepStrategy::Last => present[present.len() - 1],
                KeepStrategy::MostComplete => most_complete(&present, original),
            };
            remove.extend(present.into_iter().filter(|origin| *origin != survivor));
        }
        remove
    }
}

/// Row with the highest share of filled fields; ties keep the earliest.
fn most_complete(candidates: &[usize], original: &Dataset) -> usize {
    let columns = original.columns();
    let mut best = candidates[0];
    let mut best_score = f64::NEG_INFINITY;
    for &origin in candidates {
        let score = original
            .rows()
            .get(origin)
            .map_or(0.0, |row| row.completeness(columns));
        if score > best_score {
            best = origin;
            best_score = score;
        }
    }
    best
}

fn strategy_label(strategy: MissingDataStrategy, fill: &CellValue) -> String {
    let name = match strategy {
        MissingDataStrategy::ImputeMean => "mean",
        MissingDataStrategy::ImputeMedian => "median",
        _ => "mode",
    };
    format!("{} ({})", name, fill)
}

/// Distinct columns in first-seen order.
pub(crate) fn distinct_columns<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DuplicateIssue, SpeederIssue, StraightLinerIssue};
    use pretty_assertions::assert_eq;

    fn sample() -> Dataset {
        Dataset::from_records(
            vec![Column::text("ResponseID"), Column::number("Age"), Column::text("Comment")],
            &[
                vec!["R1", "30", "  good  "],
                vec!["R2", "", "fine"],
                vec!["R1", "30", ""],
                vec!["R3", "50", "ok"],
                vec!["R4", "", "meh"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_remove_origins_keeps_map_sorted() {
        let mut working = WorkingSet::from_dataset(&sample());
        let removed = working.remove_origins(&BTreeSet::from([1, 3]));
        assert_eq!(removed, vec![1, 3]);
        assert_eq!(working.origins, vec![0, 2, 4]);
        assert!(working.contains(2));
        assert!(!working.contains(3));
    }

    #[test]
    fn test_clean_text_single_action() {
        let mut working = WorkingSet::from_dataset(&sample());
        let mut log = RunLog::default();
        RemediationExecutor::clean_text(&mut working, &TextQualitySettings::default(), &mut log)
            .unwrap();
        assert_eq!(log.actions.len(), 1);
        assert_eq!(log.actions[0].affected.rows, vec![0]);
        assert_eq!(log.actions[0].affected.columns, vec!["Comment"]);
        assert_eq!(working.rows[0].get("Comment").as_text(), Some("good"));
    }

    #[test]
    fn test_impute_median_records_original_indices() {
        let original = sample();
        let mut working = WorkingSet::from_dataset(&original);
        working.remove_origins(&BTreeSet::from([0]));
        let issue = MissingDataIssue {
            column: "Age".to_string(),
            row_indices: vec![1, 4],
            missing_count: 2,
            total_count: 5,
            missing_percentage: 40.0,
        };
        let settings = MissingDataSettings {
            strategy: MissingDataStrategy::ImputeMedian,
            ..Default::default()
        };
        let mut log = RunLog::default();
        RemediationExecutor::handle_missing(&mut working, &[issue], &settings, &mut log).unwrap();

        assert_eq!(log.actions.len(), 1);
        assert_eq!(log.actions[0].action_type, ActionType::ValuesImputed);
        assert_eq!(log.actions[0].affected.rows, vec![1, 4]);
        assert_eq!(log.actions[0].affected.count, 2);
        assert_eq!(working.rows[0].get("Age").as_number(), Some(40.0));
    }

    #[test]
    fn test_missing_remove_strategy() {
        let mut working = WorkingSet::from_dataset(&sample());
        let issue = MissingDataIssue {
            column: "Age".to_string(),
            row_indices: vec![1, 4],
            missing_count: 2,
            total_count: 5,
            missing_percentage: 40.0,
        };
        let settings = MissingDataSettings {
            strategy: MissingDataStrategy::Remove,
            ..Default::default()
        };
        let mut log = RunLog::default();
        RemediationExecutor::handle_missing(&mut working, &[issue], &settings, &mut log).unwrap();
        assert_eq!(working.origins, vec![0, 2, 3]);
        assert_eq!(log.actions[0].action_type, ActionType::RowsRemovedMissing);
        assert_eq!(log.actions[0].affected.rows, vec![1, 4]);
    }

    #[test]
    fn test_overlapping_categories_counted_once() {
        let original = sample();
        let mut working = WorkingSet::from_dataset(&original);
        let issues = DetectedIssues {
            duplicates: vec![DuplicateIssue {
                group_id: "respondent-R1".to_string(),
                row_indices: vec![0, 2],
                similarity: 1.0,
            }],
            speeders: vec![
                SpeederIssue {
                    row_index: 2,
                    column: "Duration".to_string(),
                    completion_time: 3.0,
                    threshold: 90.0,
                    percentile: 0.0,
                },
                SpeederIssue {
                    row_index: 3,
                    column: "Duration".to_string(),
                    completion_time: 4.0,
                    threshold: 90.0,
                    percentile: 20.0,
                },
            ],
            straight_liners: vec![StraightLinerIssue {
                row_index: 3,
                columns: vec![],
                variance: 0.0,
                threshold: 0.5,
            }],
            ..Default::default()
        };
        let mut log = RunLog::default();
        RemediationExecutor::remove_flagged_rows(
            &mut working,
            &original,
            &issues,
            &DuplicateSettings::default(),
            &mut log,
        )
        .unwrap();

        assert_eq!(working.origins, vec![0, 1, 4]);
        let summary: Vec<(ActionType, Vec<usize>)> = log
            .actions
            .iter()
            .map(|a| (a.action_type, a.affected.rows.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ActionType::DuplicatesRemoved, vec![2]),
                (ActionType::SpeedersRemoved, vec![3]),
            ]
        );
    }

    #[test]
    fn test_keep_most_complete() {
        let original = sample();
        let working = WorkingSet::from_dataset(&original);
        let issues = DetectedIssues {
            duplicates: vec![DuplicateIssue {
                group_id: "similar-1".to_string(),
                row_indices: vec![2, 0],
                similarity: 1.0,
            }],
            ..Default::default()
        };
        let remove = RemediationExecutor::duplicate_removals(
            &working,
            &original,
            &issues,
            KeepStrategy::MostComplete,
        );
        // Row 0 has a comment, row 2 does not.
        assert_eq!(remove, BTreeSet::from([2]));

        let remove =
            RemediationExecutor::duplicate_removals(&working, &original, &issues, KeepStrategy::Last);
        assert_eq!(remove, BTreeSet::from([0]));
    }

    #[test]
    fn test_distinct_columns() {
        let names = ["b", "a", "b", "c", "a"];
        assert_eq!(distinct_columns(names.into_iter()), vec!["b", "a", "c"]);
    }
}
