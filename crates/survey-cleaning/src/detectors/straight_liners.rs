//! Straight-lining detection: the same answer given to every rating question.

use crate::config::StraightLinerSettings;
use crate::dataset::{ColumnType, Dataset};
use crate::error::Result;
use crate::heuristics::NameHeuristics;
use crate::stats;
use crate::types::StraightLinerIssue;
use tracing::debug;

pub struct StraightLinerDetector;

impl StraightLinerDetector {
    pub fn detect(
        dataset: &Dataset,
        settings: &StraightLinerSettings,
    ) -> Result<Vec<StraightLinerIssue>> {
        Self::detect_with(dataset, settings, &NameHeuristics::default())
    }

    pub fn detect_with(
        dataset: &Dataset,
        settings: &StraightLinerSettings,
        heuristics: &NameHeuristics,
    ) -> Result<Vec<StraightLinerIssue>> {
        if !settings.enabled {
            return Ok(Vec::new());
        }

        let columns = Self::rating_columns(dataset, settings, heuristics)?;
        if columns.len() < settings.minimum_questions {
            debug!(
                "Only {} rating columns (need {}), skipping straight-liner detection",
                columns.len(),
                settings.minimum_questions
            );
            return Ok(Vec::new());
        }

        let mut issues = Vec::new();
        for (row_index, row) in dataset.rows().iter().enumerate() {
            let answers: Vec<f64> = columns
                .iter()
                .filter_map(|column| row.get(column).as_number())
                .collect();
            if answers.len() < settings.minimum_questions {
                continue;
            }
            if let Some(variance) = stats::population_variance(&answers)
                && variance < settings.variance_threshold
            {
                issues.push(StraightLinerIssue {
                    row_index,
                    columns: columns.clone(),
                    variance,
                    threshold: settings.variance_threshold,
                });
            }
        }
        Ok(issues)
    }

    /// Explicit columns when configured, otherwise categorical columns named like a rating scale.
    fn rating_columns(
        dataset: &Dataset,
        settings: &StraightLinerSettings,
        heuristics: &NameHeuristics,
    ) -> Result<Vec<String>> {
        match &settings.likert_columns {
            Some(names) => names
                .iter()
                .map(|name| dataset.require_column(name).map(|c| c.name.clone()))
                .collect(),
            None => Ok(dataset
                .columns_of_type(ColumnType::Categorical)
                .filter(|c| (heuristics.likert)(&c.name))
                .map(|c| c.name.clone())
                .collect()),
        }
    }
}
