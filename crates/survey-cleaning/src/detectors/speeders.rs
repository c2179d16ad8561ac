//! Speeder detection: responses completed much faster than their peers.

use crate::config::{SpeederMethod, SpeederSettings};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::heuristics::NameHeuristics;
use crate::stats;
use crate::types::SpeederIssue;
use tracing::debug;

pub struct SpeederDetector;

impl SpeederDetector {
    pub fn detect(dataset: &Dataset, settings: &SpeederSettings) -> Result<Vec<SpeederIssue>> {
        Self::detect_with(dataset, settings, &NameHeuristics::default())
    }

    pub fn detect_with(
        dataset: &Dataset,
        settings: &SpeederSettings,
        heuristics: &NameHeuristics,
    ) -> Result<Vec<SpeederIssue>> {
        if !settings.enabled {
            return Ok(Vec::new());
        }
        let Some(column) = dataset
            .columns()
            .iter()
            .find(|c| (heuristics.duration)(&c.name))
        else {
            debug!("No duration column found, skipping speeder detection");
            return Ok(Vec::new());
        };

        // Zero, negative and non-numeric durations never enter the pool.
        let durations: Vec<(usize, f64)> = dataset
            .numeric_values(&column.name)
            .into_iter()
            .filter(|(_, seconds)| *seconds > 0.0)
            .collect();
        if durations.is_empty() {
            return Ok(Vec::new());
        }

        let values: Vec<f64> = durations.iter().map(|(_, v)| *v).collect();
        let sorted = stats::sort_ascending(&values);
        let Some(threshold) = Self::threshold(&sorted, settings) else {
            return Ok(Vec::new());
        };
        debug!(
            "Speeder threshold for '{}' is {:.2}s ({:?})",
            column.name, threshold, settings.method
        );

        let total = sorted.len() as f64;
        let issues = durations
            .into_iter()
            .filter(|(_, seconds)| *seconds < threshold)
            .map(|(row_index, seconds)| {
                let faster = sorted.partition_point(|v| *v < seconds);
                SpeederIssue {
                    row_index,
                    column: column.name.clone(),
                    completion_time: seconds,
                    threshold,
                    percentile: faster as f64 / total * 100.0,
                }
            })
            .collect();
        Ok(issues)
    }

    fn threshold(sorted: &[f64], settings: &SpeederSettings) -> Option<f64> {
        match settings.method {
            SpeederMethod::Absolute => Some(settings.absolute_threshold),
            SpeederMethod::Percentile => {
                stats::rank_quantile(sorted, settings.percentile_threshold / 100.0)
            }
            SpeederMethod::MedianMultiple => {
                stats::median(sorted).map(|median| median * settings.median_multiple)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Row};

    fn durations_dataset(values: &[f64]) -> Dataset {
        let rows = values
            .iter()
            .map(|v| Row::new().with("Duration (in seconds)", *v))
            .collect();
        Dataset::new(vec![Column::number("Duration (in seconds)")], rows).unwrap()
    }

    #[test]
    fn test_median_multiple_flags_fast_rows() {
        let mut values = vec![5.0; 5];
        values.extend(std::iter::repeat_n(300.0, 95));
        let data = durations_dataset(&values);

        let issues = SpeederDetector::detect(&data, &SpeederSettings::default()).unwrap();

        assert_eq!(issues.len(), 5);
        for (expected_row, issue) in issues.iter().enumerate() {
            assert_eq!(issue.row_index, expected_row);
            assert!((issue.threshold - 90.0).abs() < 1e-9);
            assert!(issue.percentile >= 0.0 && issue.percentile <= 5.0);
        }
    }

    #[test]
    fn test_absolute_threshold() {
        let data = durations_dataset(&[30.0, 59.9, 60.0, 200.0]);
        let settings = SpeederSettings {
            method: SpeederMethod::Absolute,
            ..Default::default()
        };
        let issues = SpeederDetector::detect(&data, &settings).unwrap();
        let rows: Vec<usize> = issues.iter().map(|i| i.row_index).collect();
        assert_eq!(rows, vec![0, 1]);
        assert_eq!(issues[1].percentile, 25.0);
    }

    #[test]
    fn test_percentile_threshold() {
        let values: Vec<f64> = (1..=20).map(|v| f64::from(v) * 10.0).collect();
        let data = durations_dataset(&values);
        let settings = SpeederSettings {
            method: SpeederMethod::Percentile,
            percentile_threshold: 10.0,
            ..Default::default()
        };
        let issues = SpeederDetector::detect(&data, &settings).unwrap();
        // sorted[floor(0.1 * 20)] = 30
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].threshold, 30.0);
    }

    #[test]
    fn test_invalid_durations_excluded() {
        let rows = vec![
            Row::new().with("Duration", 0.0),
            Row::new().with("Duration", -4.0),
            Row::new().with("Duration", "fast"),
            Row::new(),
            Row::new().with("Duration", 10.0),
            Row::new().with("Duration", 100.0),
        ];
        let data = Dataset::new(vec![Column::number("Duration")], rows).unwrap();
        let settings = SpeederSettings {
            method: SpeederMethod::Absolute,
            absolute_threshold: 50.0,
            ..Default::default()
        };
        let issues = SpeederDetector::detect(&data, &settings).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row_index, 4);
        assert_eq!(issues[0].percentile, 0.0);
    }

    #[test]
    fn test_no_duration_column() {
        let data = Dataset::new(
            vec![Column::number("Start Time")],
            vec![Row::new().with("Start Time", 1.0)],
        )
        .unwrap();
        assert!(
            SpeederDetector::detect(&data, &SpeederSettings::default())
                .unwrap()
                .is_empty()
        );
    }
}
