//! Survey Data Cleaning Library
//!
//! Detection and remediation of common quality problems in survey response
//! data, built with Rust and Polars.
//!
//! # Overview
//!
//! Six independent detectors inspect a [`Dataset`]:
//!
//! - **Duplicates**: repeated respondent ids, or near-identical rows
//! - **Speeders**: implausibly short completion times
//! - **Straight-liners**: the same answer to every rating question
//! - **Outliers**: numeric values outside IQR fences or a z-score limit
//! - **Missing data**: columns with a high share of empty answers
//! - **Text quality**: gibberish, keyboard mashing and too-short answers
//!
//! [`AutoCleaner`] runs them on the original dataset, applies remediations
//! in a fixed order on a working copy and returns a [`CleaningReport`]
//! recording every action taken.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use survey_cleaning::{AutoCleaner, CleaningSettings, ColumnTypeOverrides};
//! use survey_cleaning::config::{KeepStrategy, OutlierAction};
//! use survey_cleaning::reporting::render_markdown;
//!
//! let dataset = survey_cleaning::ingest::read_csv("responses.csv", &ColumnTypeOverrides::new())?;
//!
//! let settings = CleaningSettings::builder()
//!     .keep_strategy(KeepStrategy::MostComplete)
//!     .outlier_action(OutlierAction::Cap)
//!     .build()?;
//!
//! let outcome = AutoCleaner::builder()
//!     .on_progress(|update| println!("[{:.0}%] {}", update.progress * 100.0, update.message))
//!     .build()
//!     .run(&dataset, &settings)?;
//!
//! println!("{}", render_markdown(&outcome.report));
//! ```
//!
//! # Detection only
//!
//! ```rust,ignore
//! let pass = AutoCleaner::default().detect(&dataset, &CleaningSettings::default());
//! println!("{} issues", pass.issues.total_count());
//! ```
//!
//! # Advisors and templates
//!
//! Settings can come from a stored [`templates::CleaningTemplate`] or from a
//! [`advisory::CleaningAdvisor`] via [`AutoCleaner::run_with_advisor`]. Both
//! produce plain [`CleaningSettings`] values.

pub mod advisory;
pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod detectors;
pub mod error;
pub mod heuristics;
pub mod imputers;
pub mod ingest;
pub mod pipeline;
pub mod reporting;
pub mod stats;
pub mod templates;
pub mod types;

// Re-exports for convenient access
pub use config::{CleaningSettings, CleaningSettingsBuilder, SettingsValidationError};
pub use dataset::{CellValue, Column, ColumnType, Dataset, Row};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use heuristics::NameHeuristics;
pub use ingest::ColumnTypeOverrides;
pub use pipeline::{
    AutoCleaner, AutoCleanerBuilder, CleaningStage, ClosureProgressReporter, DetectionPass,
    ProgressReporter, ProgressUpdate,
};
pub use reporting::{ReportFormat, ReportGenerator, render_markdown};
pub use templates::{
    CleaningTemplate, InMemoryTemplateStore, JsonFileTemplateStore, TemplateStore,
};
pub use types::{
    ActionType, CleaningAction, CleaningOutcome, CleaningReport, CleaningSummary, DetectedIssues,
    Detector,
};
