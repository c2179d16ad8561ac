//! Advisor trait and the values exchanged with it.

use crate::config::{
    CleaningSettings, KeepStrategy, MissingDataStrategy, OutlierAction, OutlierMethod,
    SettingsValidationError, SpeederMethod,
};
use crate::dataset::{ColumnType, Dataset};
use crate::heuristics::NameHeuristics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Number of example values included per column.
const SAMPLE_VALUES: usize = 5;

/// Shape of one column as seen by an advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnOverview {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub missing_percentage: f64,
    pub distinct_count: usize,
    pub sample_values: Vec<String>,
    pub likely_duration: bool,
    pub likely_likert: bool,
}

/// Compact description of a dataset, small enough to send to a remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOverview {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnOverview>,
}

impl DatasetOverview {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let heuristics = NameHeuristics::default();
        let rows = dataset.rows();

        let columns = dataset
            .columns()
            .iter()
            .map(|column| {
                let present: Vec<String> = rows
                    .iter()
                    .map(|row| row.get(&column.name))
                    .filter(|cell| !cell.is_missing())
                    .map(|cell| cell.to_string())
                    .collect();
                let missing = rows.len() - present.len();
                let distinct: BTreeSet<&str> = present.iter().map(String::as_str).collect();

                ColumnOverview {
                    name: column.name.clone(),
                    column_type: column.column_type,
                    missing_percentage: if rows.is_empty() {
                        0.0
                    } else {
                        missing as f64 / rows.len() as f64 * 100.0
                    },
                    distinct_count: distinct.len(),
                    sample_values: distinct
                        .iter()
                        .take(SAMPLE_VALUES)
                        .map(|s| s.to_string())
                        .collect(),
                    likely_duration: (heuristics.duration)(&column.name),
                    likely_likert: column.column_type == ColumnType::Categorical
                        && (heuristics.likert)(&column.name),
                }
            })
            .collect();

        Self {
            row_count: dataset.row_count(),
            column_count: dataset.column_count(),
            columns,
        }
    }
}

/// Settings an advisor wants changed. Absent fields keep the caller's value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsRecommendation {
    pub similarity_threshold: Option<f64>,
    pub keep_strategy: Option<KeepStrategy>,
    pub speeder_method: Option<SpeederMethod>,
    pub absolute_threshold: Option<f64>,
    pub percentile_threshold: Option<f64>,
    pub median_multiple: Option<f64>,
    pub variance_threshold: Option<f64>,
    pub outlier_method: Option<OutlierMethod>,
    pub outlier_action: Option<OutlierAction>,
    pub missing_strategy: Option<MissingDataStrategy>,
    pub missing_threshold: Option<f64>,
    /// Free-text explanation from the advisor, logged but not applied.
    pub rationale: Option<String>,
}

impl SettingsRecommendation {
    /// Overlay the recommendation on `base` and validate the result.
    pub fn apply(
        &self,
        base: &CleaningSettings,
    ) -> Result<CleaningSettings, SettingsValidationError> {
        let mut settings = base.clone();

        if let Some(v) = self.similarity_threshold {
            settings.duplicates.similarity_threshold = v;
        }
        if let Some(v) = self.keep_strategy {
            settings.duplicates.keep_strategy = v;
        }
        if let Some(v) = self.speeder_method {
            settings.speeders.method = v;
        }
        if let Some(v) = self.absolute_threshold {
            settings.speeders.absolute_threshold = v;
        }
        if let Some(v) = self.percentile_threshold {
            settings.speeders.percentile_threshold = v;
        }
        if let Some(v) = self.median_multiple {
            settings.speeders.median_multiple = v;
        }
        if let Some(v) = self.variance_threshold {
            settings.straight_liners.variance_threshold = v;
        }
        if let Some(v) = self.outlier_method {
            settings.outliers.method = v;
        }
        if let Some(v) = self.outlier_action {
            settings.outliers.action = v;
        }
        if let Some(v) = self.missing_strategy {
            settings.missing_data.strategy = v;
        }
        if let Some(v) = self.missing_threshold {
            settings.missing_data.threshold = v;
        }

        settings.validate()?;
        Ok(settings)
    }
}

/// Source of recommended settings for a dataset.
///
/// Implementations must be `Send + Sync`. Errors are reported through
/// `anyhow::Result`; the cleaner treats any error as "no recommendation".
pub trait CleaningAdvisor: Send + Sync {
    /// Advisor name for logging and warnings.
    fn name(&self) -> &str;

    fn recommend(&self, overview: &DatasetOverview) -> anyhow::Result<SettingsRecommendation>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overview_from_dataset() {
        let dataset = Dataset::from_records(
            vec![
                Column::number("Duration (in seconds)"),
                Column::categorical("Q1 Satisfaction"),
            ],
            &[vec!["120", "4"], vec!["", "4"], vec!["95", "2"], vec!["88", "5"]],
        )
        .unwrap();

        let overview = DatasetOverview::from_dataset(&dataset);
        assert_eq!(overview.row_count, 4);
        assert_eq!(overview.columns.len(), 2);

        let duration = &overview.columns[0];
        assert_eq!(duration.missing_percentage, 25.0);
        assert!(duration.likely_duration);

        let q1 = &overview.columns[1];
        assert_eq!(q1.distinct_count, 3);
        assert_eq!(q1.sample_values, vec!["2", "4", "5"]);
    }

    #[test]
    fn test_apply_overlays_fields() {
        let recommendation = SettingsRecommendation {
            speeder_method: Some(SpeederMethod::Absolute),
            absolute_threshold: Some(90.0),
            missing_threshold: Some(30.0),
            ..Default::default()
        };
        let settings = recommendation.apply(&CleaningSettings::default()).unwrap();
        assert_eq!(settings.speeders.method, SpeederMethod::Absolute);
        assert_eq!(settings.speeders.absolute_threshold, 90.0);
        assert_eq!(settings.missing_data.threshold, 30.0);
        assert_eq!(settings.outliers, CleaningSettings::default().outliers);
    }

    #[test]
    fn test_apply_rejects_out_of_range() {
        let recommendation = SettingsRecommendation {
            percentile_threshold: Some(150.0),
            ..Default::default()
        };
        assert!(recommendation.apply(&CleaningSettings::default()).is_err());
    }

    #[test]
    fn test_recommendation_parses_partial_json() {
        let json = r#"{"outlierAction": "cap", "rationale": "Income is skewed"}"#;
        let recommendation: SettingsRecommendation = serde_json::from_str(json).unwrap();
        assert_eq!(recommendation.outlier_action, Some(OutlierAction::Cap));
        assert_eq!(recommendation.similarity_threshold, None);
    }
}
