//! Progress reporting for cleaning runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use survey_cleaning::AutoCleaner;
//!
//! let outcome = AutoCleaner::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()
//!     .run(&dataset, &settings)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of a cleaning run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Running the six detectors on the original dataset
    Detecting,
    /// Normalizing free-text answers
    TextCleaning,
    /// Imputing or removing missing values
    MissingData,
    /// Removing duplicates, speeders and straight-liners
    RowRemoval,
    /// Removing, capping or flagging outliers
    OutlierHandling,
    /// Building the report
    Reporting,
    /// Run finished
    Complete,
}

impl CleaningStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Detecting => "Detecting Issues",
            Self::TextCleaning => "Cleaning Text",
            Self::MissingData => "Handling Missing Data",
            Self::RowRemoval => "Removing Rows",
            Self::OutlierHandling => "Handling Outliers",
            Self::Reporting => "Generating Report",
            Self::Complete => "Complete",
        }
    }

    /// Share of the overall run taken by this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Detecting => 0.50,
            Self::TextCleaning => 0.10,
            Self::MissingData => 0.10,
            Self::RowRemoval => 0.10,
            Self::OutlierHandling => 0.10,
            Self::Reporting => 0.10,
            Self::Complete => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Detecting => 0.0,
            Self::TextCleaning => 0.50,
            Self::MissingData => 0.60,
            Self::RowRemoval => 0.70,
            Self::OutlierHandling => 0.80,
            Self::Reporting => 0.90,
            Self::Complete => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: CleaningStage,

    /// Optional sub-stage description (e.g. the detector currently running)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage without sub-stage info.
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a new progress update with sub-stage information.
    pub fn with_sub_stage(
        stage: CleaningStage,
        sub_stage: impl Into<String>,
        stage_progress: f32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sub_stage: Some(sub_stage.into()),
            ..Self::new(stage, stage_progress, message)
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(CleaningStage::Complete, 1.0, message)
    }
}

/// Trait for receiving progress updates during a cleaning run.
///
/// Implementations must be `Send + Sync` so a UI can receive updates from a
/// cleaner running on a background thread.
pub trait ProgressReporter: Send + Sync {
    /// Called at every stage boundary and once per detector.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_stage_weights_sum_to_one() {
        let stages = [
            CleaningStage::Detecting,
            CleaningStage::TextCleaning,
            CleaningStage::MissingData,
            CleaningStage::RowRemoval,
            CleaningStage::OutlierHandling,
            CleaningStage::Reporting,
        ];
        let total: f32 = stages.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);
        for pair in stages.windows(2) {
            let end = pair[0].base_progress() + pair[0].weight();
            assert!((end - pair[1].base_progress()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_progress_update_clamps() {
        let update = ProgressUpdate::new(CleaningStage::RowRemoval, 2.0, "x");
        assert_eq!(update.stage_progress, 1.0);
        assert!(update.progress <= 1.0);

        let update = ProgressUpdate::with_sub_stage(CleaningStage::Detecting, "outliers", 0.5, "y");
        assert_eq!(update.sub_stage.as_deref(), Some("outliers"));
        assert!((update.progress - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ClosureProgressReporter::new(move |update: ProgressUpdate| {
            sink.lock().unwrap().push(update.stage);
        });
        reporter.report(ProgressUpdate::complete("done"));
        assert_eq!(*seen.lock().unwrap(), vec![CleaningStage::Complete]);
    }
}
