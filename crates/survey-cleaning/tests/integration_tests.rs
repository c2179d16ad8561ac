//! Integration tests for the survey cleaning engine.
//!
//! These tests verify end-to-end behavior of a cleaning run on CSV fixtures
//! and on generated datasets.

use pretty_assertions::assert_eq;
use survey_cleaning::config::{
    CleaningMode, KeepStrategy, MissingDataStrategy, OutlierAction, SpeederMethod,
    StraightLinerSettings,
};
use survey_cleaning::ingest::{self, ColumnTypeOverrides};
use survey_cleaning::types::{TextIssue, TextProblem};
use survey_cleaning::{
    ActionType, AutoCleaner, CleaningReport, CleaningSettings, CleaningStage, Column,
    ColumnType, Dataset, Row, render_markdown,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> Dataset {
    ingest::read_csv(fixtures_path().join(filename), &ColumnTypeOverrides::new())
        .expect("Failed to read fixture")
}

fn clean(dataset: &Dataset, settings: &CleaningSettings) -> survey_cleaning::CleaningOutcome {
    AutoCleaner::default()
        .run(dataset, settings)
        .expect("Cleaning run should succeed")
}

/// Rows removed according to the action log.
fn removed_by_actions(report: &CleaningReport) -> usize {
    report
        .actions
        .iter()
        .filter(|a| a.action_type.removes_rows())
        .map(|a| a.affected.count)
        .sum()
}

fn durations(values: &[f64]) -> Dataset {
    let rows = values
        .iter()
        .map(|v| Row::new().with("Duration (in seconds)", *v))
        .collect();
    Dataset::new(vec![Column::number("Duration (in seconds)")], rows).unwrap()
}

// ============================================================================
// Fixture Loading
// ============================================================================

#[test]
fn test_fixture_column_types() {
    let dataset = load_fixture("survey_responses.csv");
    assert_eq!(dataset.row_count(), 12);
    assert_eq!(dataset.column("ResponseID").unwrap().column_type, ColumnType::Text);
    assert_eq!(
        dataset.column("Duration (in seconds)").unwrap().column_type,
        ColumnType::Number
    );
    assert_eq!(
        dataset.column("Q3 Satisfaction").unwrap().column_type,
        ColumnType::Categorical
    );
    assert_eq!(dataset.column("Comments").unwrap().column_type, ColumnType::Text);
    assert!(dataset.rows()[3].get("Age").is_missing());
}

// ============================================================================
// Detection Scenarios
// ============================================================================

#[test]
fn test_survey_fixture_detection() {
    let dataset = load_fixture("survey_responses.csv");
    let pass = AutoCleaner::default().detect(&dataset, &CleaningSettings::default());
    let issues = &pass.issues;

    assert!(pass.errors.is_empty());

    // Repeated ResponseID R001
    assert_eq!(issues.duplicates.len(), 1);
    assert_eq!(issues.duplicates[0].row_indices, vec![0, 5]);
    assert_eq!(issues.duplicates[0].similarity, 1.0);

    let speeders: Vec<usize> = issues.speeders.iter().map(|i| i.row_index).collect();
    assert_eq!(speeders, vec![2, 11]);
    assert!((issues.speeders[0].threshold - 178.5).abs() < 1e-9);

    let straight_liners: Vec<usize> = issues.straight_liners.iter().map(|i| i.row_index).collect();
    assert_eq!(straight_liners, vec![2, 11]);

    let outliers: Vec<(usize, &str)> = issues
        .outliers
        .iter()
        .map(|i| (i.row_index, i.column.as_str()))
        .collect();
    assert_eq!(
        outliers,
        vec![(2, "Duration (in seconds)"), (11, "Duration (in seconds)")]
    );

    assert!(issues.missing_data.is_empty());

    // Ids like R001 have no vowels
    let id_issues = issues
        .text_quality
        .iter()
        .filter(|i| i.column == "ResponseID")
        .count();
    assert_eq!(id_issues, 12);

    let comments: Vec<&TextIssue> = issues
        .text_quality
        .iter()
        .filter(|i| i.column == "Comments")
        .collect();
    let text: Vec<usize> = comments.iter().map(|i| i.row_index).collect();
    assert_eq!(text, vec![2, 6, 11]);
    let aaaaaa = comments[2];
    assert!(aaaaaa.problems.contains(&TextProblem::RepeatedChars));
    assert!(aaaaaa.problems.contains(&TextProblem::SingleCharRepeated));
    assert!(!aaaaaa.problems.contains(&TextProblem::NoVowels));
    assert!(comments[1].problems.contains(&TextProblem::NoVowels));
}

#[test]
fn test_identifier_columns_can_be_excluded_from_text_checks() {
    let dataset = load_fixture("survey_responses.csv");
    let mut settings = CleaningSettings::default();
    settings.text_quality.skip_identifier_columns = true;

    let pass = AutoCleaner::default().detect(&dataset, &settings);
    let rows: Vec<usize> = pass.issues.text_quality.iter().map(|i| i.row_index).collect();
    assert_eq!(rows, vec![2, 6, 11]);
    assert!(pass.issues.text_quality.iter().all(|i| i.column == "Comments"));
}

#[test]
fn test_detection_is_idempotent() {
    let dataset = load_fixture("survey_responses.csv");
    let settings = CleaningSettings::default();
    let cleaner = AutoCleaner::default();
    assert_eq!(
        cleaner.detect(&dataset, &settings).issues,
        cleaner.detect(&dataset, &settings).issues
    );
}

#[test]
fn test_hundred_row_speeder_scenario() {
    let mut values = vec![5.0; 5];
    values.extend(std::iter::repeat_n(300.0, 95));
    let settings = CleaningSettings::builder()
        .speeder_method(SpeederMethod::MedianMultiple)
        .median_multiple(0.3)
        .build()
        .unwrap();

    let pass = AutoCleaner::default().detect(&durations(&values), &settings);
    let speeders = &pass.issues.speeders;

    assert_eq!(speeders.len(), 5);
    for (expected_row, issue) in speeders.iter().enumerate() {
        assert_eq!(issue.row_index, expected_row);
        assert!((issue.threshold - 90.0).abs() < 1e-9);
        assert!(issue.percentile <= 5.0);
    }
}

#[test]
fn test_invalid_durations_are_not_flagged() {
    let dataset = Dataset::from_records(
        vec![Column::number("Duration")],
        &[
            vec!["300"],
            vec!["0"],
            vec!["-20"],
            vec!["abc"],
            vec![""],
            vec!["310"],
            vec!["290"],
        ],
    )
    .unwrap();
    let pass = AutoCleaner::default().detect(&dataset, &CleaningSettings::default());
    assert!(pass.issues.speeders.is_empty());
}

#[test]
fn test_variance_boundary() {
    let columns: Vec<Column> = (1..=5)
        .map(|i| Column::categorical(format!("Q{} Rating", i)))
        .collect();
    let dataset = Dataset::from_records(
        columns,
        &[vec!["3", "3", "3", "3", "3"], vec!["1", "5", "1", "5", "1"]],
    )
    .unwrap();
    let settings = CleaningSettings::builder()
        .straight_liners(StraightLinerSettings {
            variance_threshold: 2.0,
            ..Default::default()
        })
        .build()
        .unwrap();

    let pass = AutoCleaner::default().detect(&dataset, &settings);
    let rows: Vec<usize> = pass.issues.straight_liners.iter().map(|i| i.row_index).collect();
    assert_eq!(rows, vec![0]);
}

#[test]
fn test_detector_failure_is_reported_not_fatal() {
    let dataset = load_fixture("survey_responses.csv");
    let settings = CleaningSettings::builder()
        .straight_liners(StraightLinerSettings {
            likert_columns: Some(vec!["Q9 Satisfaction".to_string()]),
            ..Default::default()
        })
        .build()
        .unwrap();

    let outcome = clean(&dataset, &settings);
    assert_eq!(outcome.report.errors.len(), 1);
    assert!(outcome.report.errors[0].contains("straight-liners"));
    assert!(outcome.report.issues.straight_liners.is_empty());
    assert_eq!(outcome.report.issues.speeders.len(), 2);
}

// ============================================================================
// Full Cleaning Runs
// ============================================================================

#[test]
fn test_default_run_on_survey_fixture() {
    let dataset = load_fixture("survey_responses.csv");
    let outcome = clean(&dataset, &CleaningSettings::default());
    let report = &outcome.report;

    assert_eq!(report.summary.original_rows, 12);
    assert_eq!(report.summary.final_rows, 9);
    assert_eq!(report.summary.rows_removed, 3);
    assert_eq!(report.summary.final_columns, 9);
    // Every row carries an id text issue
    assert_eq!(report.summary.rows_flagged, 12);
    assert_eq!(outcome.cleaned.row_count(), 9);
    assert_eq!(outcome.cleaned.columns(), dataset.columns());

    let duplicates = report
        .actions
        .iter()
        .find(|a| a.action_type == ActionType::DuplicatesRemoved)
        .unwrap();
    assert_eq!(duplicates.affected.rows, vec![5]);

    let speeders = report
        .actions
        .iter()
        .find(|a| a.action_type == ActionType::SpeedersRemoved)
        .unwrap();
    assert_eq!(speeders.affected.rows, vec![2, 11]);

    // Outliers default to flag
    assert!(
        report
            .warnings
            .iter()
            .any(|w| w == "2 outliers detected and left in place")
    );
    assert!(report.errors.is_empty());
}

#[test]
fn test_row_count_conservation() {
    let dataset = load_fixture("income_panel.csv");
    let settings = CleaningSettings::builder()
        .missing_threshold(5.0)
        .missing_strategy(MissingDataStrategy::Remove)
        .outlier_action(OutlierAction::Remove)
        .build()
        .unwrap();

    let outcome = clean(&dataset, &settings);
    let report = &outcome.report;

    assert_eq!(report.issues.missing_data.len(), 2);
    assert_eq!(report.summary.final_rows, 9);
    assert_eq!(
        report.summary.final_rows,
        report.summary.original_rows - removed_by_actions(report)
    );
    assert_eq!(report.summary.rows_removed, removed_by_actions(report));

    let types: Vec<ActionType> = report.actions.iter().map(|a| a.action_type).collect();
    assert_eq!(
        types,
        vec![
            ActionType::RowsRemovedMissing,
            ActionType::RowsRemovedMissing,
            ActionType::OutliersRemoved,
        ]
    );
}

#[test]
fn test_imputation_reconciles_with_summary() {
    let dataset = load_fixture("income_panel.csv");
    let settings = CleaningSettings::builder()
        .missing_threshold(5.0)
        .missing_strategy(MissingDataStrategy::ImputeMedian)
        .build()
        .unwrap();

    let outcome = clean(&dataset, &settings);
    let report = &outcome.report;

    assert_eq!(report.summary.values_imputed, 2);
    assert_eq!(
        report.summary.columns_modified,
        vec!["Household Size".to_string(), "Income".to_string()]
    );
    assert_eq!(outcome.cleaned.rows()[6].get("Income").as_number(), Some(44000.0));
    assert_eq!(
        outcome.cleaned.rows()[9].get("Household Size").as_number(),
        Some(3.0)
    );
    assert_eq!(report.summary.final_rows, 12);
}

#[test]
fn test_cap_keeps_values_within_percentiles() {
    let rows: Vec<Row> = (1..=40)
        .map(|i| {
            let value = if i == 40 { 1000.0 } else { f64::from(i) };
            Row::new().with("Monthly Spend", value)
        })
        .collect();
    let dataset = Dataset::new(vec![Column::number("Monthly Spend")], rows).unwrap();
    let settings = CleaningSettings::builder()
        .outlier_action(OutlierAction::Cap)
        .build()
        .unwrap();

    let outcome = clean(&dataset, &settings);

    // p5 = sorted[2] = 3, p95 = sorted[38] = 39
    let values: Vec<f64> = outcome
        .cleaned
        .rows()
        .iter()
        .filter_map(|r| r.get("Monthly Spend").as_number())
        .collect();
    assert!(values.iter().all(|v| (3.0..=39.0).contains(v)));
    assert_eq!(values[39], 39.0);
    assert_eq!(values[0], 3.0);

    let capped = &outcome.report.actions[0];
    assert_eq!(capped.action_type, ActionType::OutliersCapped);
    assert_eq!(capped.affected.rows, vec![0, 1, 39]);
    assert_eq!(outcome.report.summary.columns_modified, vec!["Monthly Spend"]);
    assert_eq!(outcome.report.summary.final_rows, 40);
}

#[test]
fn test_keep_most_complete_duplicate() {
    let dataset = Dataset::from_records(
        vec![
            Column::text("ResponseID"),
            Column::number("Age"),
            Column::text("Comments"),
        ],
        &[
            vec!["R001", "", ""],
            vec!["R002", "40", "Fine"],
            vec!["R001", "33", "Helpful"],
        ],
    )
    .unwrap();
    let settings = CleaningSettings::builder()
        .keep_strategy(KeepStrategy::MostComplete)
        .build()
        .unwrap();

    let outcome = clean(&dataset, &settings);
    let removed = &outcome.report.actions[0];
    assert_eq!(removed.action_type, ActionType::DuplicatesRemoved);
    assert_eq!(removed.affected.rows, vec![0]);
    assert_eq!(outcome.cleaned.rows()[1].get("Comments").as_text(), Some("Helpful"));
}

#[test]
fn test_manual_mode_leaves_data_untouched() {
    let dataset = load_fixture("survey_responses.csv");
    let settings = CleaningSettings::builder()
        .mode(CleaningMode::Manual)
        .build()
        .unwrap();

    let outcome = clean(&dataset, &settings);
    assert_eq!(outcome.cleaned, dataset);
    assert!(outcome.report.actions.is_empty());
    assert_eq!(outcome.report.summary.rows_removed, 0);
    assert_eq!(outcome.report.issues.speeders.len(), 2);
}

#[test]
fn test_runs_are_deterministic() {
    let dataset = load_fixture("survey_responses.csv");
    let settings = CleaningSettings::builder()
        .outlier_action(OutlierAction::Cap)
        .missing_strategy(MissingDataStrategy::ImputeMean)
        .missing_threshold(1.0)
        .build()
        .unwrap();

    let first = clean(&dataset, &settings);
    let second = clean(&dataset, &settings);

    assert_eq!(first.cleaned, second.cleaned);
    assert_eq!(first.report.summary, second.report.summary);
    assert_eq!(first.report.issues, second.report.issues);
    assert_eq!(first.report.actions, second.report.actions);
    assert_eq!(first.report.warnings, second.report.warnings);
}

#[test]
fn test_preserve_original() {
    let dataset = load_fixture("survey_responses.csv");
    let settings = CleaningSettings::builder()
        .preserve_original(true)
        .build()
        .unwrap();
    let outcome = clean(&dataset, &settings);
    assert_eq!(outcome.original.as_ref(), Some(&dataset));
    assert_eq!(outcome.cleaned.row_count(), 9);
}

#[test]
fn test_text_cleaning_action() {
    let dataset = Dataset::from_records(
        vec![Column::text("Comments")],
        &[vec!["  Friendly staff  "], vec!["Fine"], vec!["Quick   delivery"]],
    )
    .unwrap();
    let outcome = clean(&dataset, &CleaningSettings::default());

    let action = &outcome.report.actions[0];
    assert_eq!(action.action_type, ActionType::TextCleaned);
    assert_eq!(action.affected.rows, vec![0, 2]);
    assert_eq!(outcome.cleaned.rows()[0].get("Comments").as_text(), Some("Friendly staff"));
    assert_eq!(outcome.report.summary.columns_modified, vec!["Comments"]);
}

// ============================================================================
// Progress Reporting
// ============================================================================

#[test]
fn test_progress_stages_reported_in_order() {
    let dataset = load_fixture("survey_responses.csv");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    AutoCleaner::builder()
        .on_progress(move |update| sink.lock().unwrap().push((update.stage, update.progress)))
        .build()
        .run(&dataset, &CleaningSettings::default())
        .unwrap();

    let seen = seen.lock().unwrap();
    let progress: Vec<f32> = seen.iter().map(|(_, p)| *p).collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last().map(|(s, _)| *s), Some(CleaningStage::Complete));
    assert_eq!(
        seen.iter().filter(|(s, _)| *s == CleaningStage::Detecting).count(),
        6
    );
}

// ============================================================================
// Reports and Export
// ============================================================================

#[test]
fn test_markdown_report_sections() {
    let dataset = load_fixture("survey_responses.csv");
    let outcome = clean(&dataset, &CleaningSettings::default());
    let md = render_markdown(&outcome.report);

    assert!(md.starts_with("# Data Cleaning Report"));
    for section in ["## Summary", "## Issues Detected", "## Actions Applied", "## Warnings"] {
        assert!(md.contains(section), "missing section {}", section);
    }
    assert!(!md.contains("## Errors"));
    assert!(md.contains("Execution time:"));
}

#[test]
fn test_cleaned_csv_export() {
    let dataset = load_fixture("survey_responses.csv");
    let outcome = clean(&dataset, &CleaningSettings::default());

    let dir = std::env::temp_dir().join(format!("survey-export-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("survey_responses-cleaned.csv");
    ingest::write_csv(&outcome.cleaned, &path).unwrap();

    let reloaded = ingest::read_csv(&path, &ColumnTypeOverrides::new()).unwrap();
    assert_eq!(reloaded.row_count(), 9);
    assert_eq!(reloaded.column_count(), 9);
    std::fs::remove_dir_all(&dir).ok();
}
