//! Outlier detection in number columns.

use crate::config::{OutlierMethod, OutlierSettings};
use crate::dataset::{ColumnType, Dataset};
use crate::error::Result;
use crate::stats;
use crate::types::OutlierIssue;
use tracing::debug;

/// Columns with fewer numeric values than this are not checked.
pub const MIN_OUTLIER_SAMPLE: usize = 10;

pub struct OutlierDetector;

impl OutlierDetector {
    pub fn detect(dataset: &Dataset, settings: &OutlierSettings) -> Result<Vec<OutlierIssue>> {
        if !settings.enabled {
            return Ok(Vec::new());
        }

        let columns: Vec<String> = match &settings.columns {
            Some(names) => names
                .iter()
                .map(|name| dataset.require_column(name).map(|c| c.name.clone()))
                .collect::<Result<_>>()?,
            None => dataset
                .columns_of_type(ColumnType::Number)
                .map(|c| c.name.clone())
                .collect(),
        };

        let mut issues = Vec::new();
        for column in &columns {
            let column_issues = Self::detect_column(dataset, column, settings);
            if !column_issues.is_empty() {
                debug!("Column '{}': {} outliers", column, column_issues.len());
            }
            issues.extend(column_issues);
        }
        Ok(issues)
    }

    fn detect_column(dataset: &Dataset, column: &str, settings: &OutlierSettings) -> Vec<OutlierIssue> {
        let cells = dataset.numeric_values(column);
        if cells.len() < MIN_OUTLIER_SAMPLE {
            return Vec::new();
        }

        let values: Vec<f64> = cells.iter().map(|(_, v)| *v).collect();
        let (Some(mean), Some(std_dev)) =
            (stats::mean(&values), stats::population_std_dev(&values))
        else {
            return Vec::new();
        };

        let is_outlier: Box<dyn Fn(f64) -> bool> = match settings.method {
            OutlierMethod::Iqr => {
                let sorted = stats::sort_ascending(&values);
                let (Some(q1), Some(q3)) = (
                    stats::rank_quantile(&sorted, 0.25),
                    stats::rank_quantile(&sorted, 0.75),
                ) else {
                    return Vec::new();
                };
                let iqr = q3 - q1;
                let lower = q1 - settings.iqr_multiple * iqr;
                let upper = q3 + settings.iqr_multiple * iqr;
                Box::new(move |v| v < lower || v > upper)
            }
            OutlierMethod::ZScore => {
                if std_dev == 0.0 {
                    return Vec::new();
                }
                let threshold = settings.z_score_threshold;
                Box::new(move |v| stats::z_score(v, mean, std_dev).abs() > threshold)
            }
        };

        cells
            .into_iter()
            .filter(|(_, value)| is_outlier(*value))
            .map(|(row_index, value)| OutlierIssue {
                row_index,
                column: column.to_string(),
                value,
                method: settings.method,
                score: stats::z_score(value, mean, std_dev),
            })
            .collect()
    }
}
