//! Auto-cleaning orchestrator.
//!
//! This module provides [`AutoCleaner`] and its builder. A run detects issues
//! on the original dataset, then applies remediations in a fixed order on a
//! working copy:
//!
//! 1. Detection (all six detectors, original snapshot)
//! 2. Text cleaning
//! 3. Missing-data imputation or removal
//! 4. Duplicate, speeder and straight-liner removal (one pass)
//! 5. Outlier removal, capping or flagging
//! 6. Report generation
//!
//! A failing step is recorded in the report's `errors` and the run continues.

use crate::advisory::{CleaningAdvisor, DatasetOverview};
use crate::config::{CleaningMode, CleaningSettings};
use crate::dataset::Dataset;
use crate::detectors::{
    DuplicateDetector, MissingDataDetector, OutlierDetector, SpeederDetector,
    StraightLinerDetector, TextQualityDetector,
};
use crate::error::{CleaningError, Result};
use crate::heuristics::NameHeuristics;
use crate::pipeline::executor::{RemediationExecutor, RunLog, WorkingSet};
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::reporting::{ReportGenerator, ReportParams};
use crate::types::{CleaningOutcome, DetectedIssues, Detector};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Issues from one detection pass plus the failures it captured.
#[derive(Debug, Clone, Default)]
pub struct DetectionPass {
    pub issues: DetectedIssues,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Runs the detectors and applies remediations.
///
/// # Example
///
/// ```rust,ignore
/// use survey_cleaning::{AutoCleaner, CleaningSettings};
///
/// let outcome = AutoCleaner::builder()
///     .on_progress(|update| println!("{}", update.message))
///     .build()
///     .run(&dataset, &CleaningSettings::default())?;
///
/// println!("{} rows removed", outcome.report.summary.rows_removed);
/// ```
#[derive(Clone, Default)]
pub struct AutoCleaner {
    heuristics: NameHeuristics,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Cleaners are shared with background threads by UI hosts
static_assertions::assert_impl_all!(AutoCleaner: Send, Sync);

impl AutoCleaner {
    pub fn builder() -> AutoCleanerBuilder {
        AutoCleanerBuilder::default()
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Run every detector against `dataset` without changing anything.
    ///
    /// A failing detector contributes an error string and no issues.
    pub fn detect(&self, dataset: &Dataset, settings: &CleaningSettings) -> DetectionPass {
        let mut pass = DetectionPass::default();
        let h = &self.heuristics;

        for (step, detector) in Detector::ALL.iter().enumerate() {
            self.report_progress(ProgressUpdate::with_sub_stage(
                CleaningStage::Detecting,
                detector.display_name(),
                step as f32 / Detector::ALL.len() as f32,
                format!("Detecting {}...", detector.display_name().to_lowercase()),
            ));

            let issues = &mut pass.issues;
            let outcome = match detector {
                Detector::Duplicates => {
                    DuplicateDetector::detect_with(dataset, &settings.duplicates, h)
                        .map(|found| issues.duplicates = found)
                }
                Detector::Speeders => SpeederDetector::detect_with(dataset, &settings.speeders, h)
                    .map(|found| issues.speeders = found),
                Detector::StraightLiners => {
                    StraightLinerDetector::detect_with(dataset, &settings.straight_liners, h)
                        .map(|found| issues.straight_liners = found)
                }
                Detector::Outliers => OutlierDetector::detect(dataset, &settings.outliers)
                    .map(|found| issues.outliers = found),
                Detector::MissingData => MissingDataDetector::detect(dataset, &settings.missing_data)
                    .map(|found| issues.missing_data = found),
                Detector::TextQuality => {
                    TextQualityDetector::detect_with(dataset, &settings.text_quality, h)
                        .map(|found| issues.text_quality = found)
                }
            };

            if let Err(e) = outcome {
                let error = CleaningError::detection(detector.name(), e.to_string());
                warn!("{}", error);
                pass.errors.push(error.to_string());
            }
        }

        if settings.duplicates.enabled
            && pass.issues.duplicates.is_empty()
            && DuplicateDetector::exceeds_pairwise_limit(dataset, &settings.duplicates)
        {
            pass.warnings.push(format!(
                "Similarity duplicate check skipped: {} rows exceeds the limit of {}",
                dataset.row_count(),
                settings.duplicates.max_pairwise_rows
            ));
        }

        info!("Detected {} issues", pass.issues.total_count());
        pass
    }

    /// Clean `dataset` according to `settings`.
    ///
    /// # Errors
    ///
    /// Only invalid settings or a structurally invalid dataset fail the run.
    /// Detector and remediation failures are recorded in `report.errors`.
    pub fn run(&self, dataset: &Dataset, settings: &CleaningSettings) -> Result<CleaningOutcome> {
        self.run_internal(dataset, settings, Vec::new())
    }

    /// Ask `advisor` for recommended settings, then run with them.
    ///
    /// If the advisor fails or recommends invalid values, the caller's
    /// settings are used and a warning is recorded.
    pub fn run_with_advisor(
        &self,
        dataset: &Dataset,
        settings: &CleaningSettings,
        advisor: &dyn CleaningAdvisor,
    ) -> Result<CleaningOutcome> {
        settings.validate()?;
        let overview = DatasetOverview::from_dataset(dataset);

        let mut warnings = Vec::new();
        let effective = match advisor.recommend(&overview) {
            Ok(recommendation) => match recommendation.apply(settings) {
                Ok(recommended) => {
                    info!("Using settings recommended by {}", advisor.name());
                    recommended
                }
                Err(e) => {
                    warnings.push(format!(
                        "Ignored recommendation from {}: {}",
                        advisor.name(),
                        e
                    ));
                    settings.clone()
                }
            },
            Err(e) => {
                let error = CleaningError::AdvisoryFailed(format!("{} unavailable: {}", advisor.name(), e));
                warnings.push(error.to_string());
                settings.clone()
            }
        };
        for warning in &warnings {
            warn!("{}", warning);
        }

        self.run_internal(dataset, &effective, warnings)
    }

    fn run_internal(
        &self,
        dataset: &Dataset,
        settings: &CleaningSettings,
        warnings: Vec<String>,
    ) -> Result<CleaningOutcome> {
        let started = Instant::now();
        settings.validate()?;
        dataset.validate()?;

        info!(
            "Starting cleaning run on {} rows x {} columns",
            dataset.row_count(),
            dataset.column_count()
        );

        let DetectionPass {
            issues,
            warnings: detection_warnings,
            errors,
        } = self.detect(dataset, settings);

        let mut log = RunLog {
            warnings,
            errors,
            ..Default::default()
        };
        log.warnings.extend(detection_warnings);

        let mut working = WorkingSet::from_dataset(dataset);

        if settings.mode == CleaningMode::Manual {
            log.warning("Manual mode: issues were detected but no remediation was applied");
        } else {
            self.remediate(&mut working, dataset, &issues, settings, &mut log);
        }

        self.report_progress(ProgressUpdate::new(
            CleaningStage::Reporting,
            0.0,
            "Generating report...",
        ));
        let cleaned = working.into_dataset();
        let report = ReportGenerator::generate(ReportParams {
            original_rows: dataset.row_count(),
            original_columns: dataset.column_count(),
            final_rows: cleaned.row_count(),
            final_columns: cleaned.column_count(),
            issues,
            actions: log.actions,
            settings: settings.clone(),
            started,
            warnings: log.warnings,
            errors: log.errors,
        });

        info!(
            "Cleaning complete: {} -> {} rows, {} actions",
            report.summary.original_rows,
            report.summary.final_rows,
            report.actions.len()
        );
        self.report_progress(ProgressUpdate::complete("Cleaning complete"));

        Ok(CleaningOutcome {
            cleaned,
            original: settings.preserve_original.then(|| dataset.clone()),
            report,
        })
    }

    /// Steps 2-5, each guarded so one failure does not stop the others.
    fn remediate(
        &self,
        working: &mut WorkingSet,
        original: &Dataset,
        issues: &DetectedIssues,
        settings: &CleaningSettings,
        log: &mut RunLog,
    ) {
        self.report_progress(ProgressUpdate::new(
            CleaningStage::TextCleaning,
            0.0,
            "Cleaning text...",
        ));
        if let Err(e) = RemediationExecutor::clean_text(working, &settings.text_quality, log) {
            log.step_failed("Text cleaning", e);
        }

        self.report_progress(ProgressUpdate::new(
            CleaningStage::MissingData,
            0.0,
            "Handling missing data...",
        ));
        if settings.missing_data.enabled
            && let Err(e) = RemediationExecutor::handle_missing(
                working,
                &issues.missing_data,
                &settings.missing_data,
                log,
            )
        {
            log.step_failed("Missing data remediation", e);
        }

        self.report_progress(ProgressUpdate::new(
            CleaningStage::RowRemoval,
            0.0,
            "Removing flagged rows...",
        ));
        if let Err(e) = RemediationExecutor::remove_flagged_rows(
            working,
            original,
            issues,
            &settings.duplicates,
            log,
        ) {
            log.step_failed("Row removal", e);
        }

        self.report_progress(ProgressUpdate::new(
            CleaningStage::OutlierHandling,
            0.0,
            "Handling outliers...",
        ));
        if settings.outliers.enabled
            && let Err(e) = OutlierHandler::handle_outliers(
                working,
                &issues.outliers,
                settings.outliers.action,
                log,
            )
        {
            log.step_failed("Outlier handling", e);
        }
    }
}

/// Builder for [`AutoCleaner`].
#[derive(Default)]
pub struct AutoCleanerBuilder {
    heuristics: Option<NameHeuristics>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl AutoCleanerBuilder {
    /// Use custom column-name heuristics.
    pub fn heuristics(mut self, heuristics: NameHeuristics) -> Self {
        self.heuristics = Some(heuristics);
        self
    }

    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Receive progress updates through a closure.
    pub fn on_progress<F>(self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter(Arc::new(ClosureProgressReporter::new(callback)))
    }

    pub fn build(self) -> AutoCleaner {
        AutoCleaner {
            heuristics: self.heuristics.unwrap_or_default(),
            progress_reporter: self.progress_reporter,
        }
    }
}
