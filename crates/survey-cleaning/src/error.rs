//! Custom error types for the cleaning engine.
//!
//! Detector-level problems never escape [`crate::AutoCleaner::run`]; they are
//! recorded as strings in the report. The errors here cover caller mistakes
//! (invalid dataset or settings), individual detector/remediation failures
//! before they are folded into the report, and the I/O edges of the crate.
//!
//! Errors are serializable so a UI layer can display them directly.

use crate::config::SettingsValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning engine.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// The dataset is structurally invalid (duplicate column names, unknown fields, ...).
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// The cleaning settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] SettingsValidationError),

    /// A column named in the settings does not exist in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A detector could not complete.
    #[error("{detector} detection failed: {reason}")]
    DetectionFailed { detector: String, reason: String },

    /// A remediation step could not complete.
    #[error("{step} failed: {reason}")]
    RemediationFailed { step: String, reason: String },

    /// No template with the given id exists in the store.
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    /// The advisory service failed or returned unusable values.
    #[error("Advisory error: {0}")]
    AdvisoryFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error wrapper (dataframe ingestion and export).
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a [`CleaningError::DetectionFailed`].
    pub fn detection(detector: impl Into<String>, reason: impl Into<String>) -> Self {
        CleaningError::DetectionFailed {
            detector: detector.into(),
            reason: reason.into(),
        }
    }

    /// Get error code for frontend handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDataset(_) => "INVALID_DATASET",
            Self::InvalidSettings(_) => "INVALID_SETTINGS",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::DetectionFailed { .. } => "DETECTION_FAILED",
            Self::RemediationFailed { .. } => "REMEDIATION_FAILED",
            Self::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            Self::AdvisoryFailed(_) => "ADVISORY_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the caller can fix this by changing its inputs.
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::InvalidDataset(_) | Self::InvalidSettings(_) | Self::ColumnNotFound(_) => true,
            Self::WithContext { source, .. } => source.is_caller_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Io(e).with_context(context))
    }
}
