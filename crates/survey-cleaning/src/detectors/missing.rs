//! Missing-data detection per column.

use crate::config::MissingDataSettings;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::types::MissingDataIssue;
use tracing::debug;

pub struct MissingDataDetector;

impl MissingDataDetector {
    /// Report columns whose missing share is at least `settings.threshold` percent.
    pub fn detect(
        dataset: &Dataset,
        settings: &MissingDataSettings,
    ) -> Result<Vec<MissingDataIssue>> {
        if !settings.enabled || dataset.is_empty() {
            return Ok(Vec::new());
        }

        let columns: Vec<&str> = match &settings.columns {
            Some(names) => names
                .iter()
                .map(|name| dataset.require_column(name).map(|c| c.name.as_str()))
                .collect::<Result<_>>()?,
            None => dataset.columns().iter().map(|c| c.name.as_str()).collect(),
        };

        let total_count = dataset.row_count();
        let mut issues = Vec::new();
        for column in columns {
            let row_indices: Vec<usize> = dataset
                .rows()
                .iter()
                .enumerate()
                .filter(|(_, row)| row.get(column).is_missing())
                .map(|(index, _)| index)
                .collect();
            let missing_count = row_indices.len();
            let missing_percentage = missing_count as f64 / total_count as f64 * 100.0;

            if missing_count > 0 && missing_percentage >= settings.threshold {
                debug!("Column '{}': {:.1}% missing", column, missing_percentage);
                issues.push(MissingDataIssue {
                    column: column.to_string(),
                    row_indices,
                    missing_count,
                    total_count,
                    missing_percentage,
                });
            }
        }
        Ok(issues)
    }
}
