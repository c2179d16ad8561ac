//! Cleaning settings.
//!
//! [`CleaningSettings`] enumerates which detectors run and with what
//! thresholds and strategies. It deserializes from partial camelCase JSON
//! (missing fields take their defaults), so values coming from the UI, from
//! stored templates or from an advisory service are all accepted as-is.
//!
//! # Example
//!
//! ```rust,ignore
//! use survey_cleaning::config::{CleaningSettings, OutlierAction, SpeederMethod};
//!
//! let settings = CleaningSettings::builder()
//!     .speeder_method(SpeederMethod::Percentile)
//!     .percentile_threshold(10.0)
//!     .outlier_action(OutlierAction::Cap)
//!     .build()?;
//! ```

use crate::error::{CleaningError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Whether the cleaner applies remediations or only detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CleaningMode {
    /// Detect and remediate
    #[default]
    Auto,
    /// Detect only; remediation is left to the user
    Manual,
}

impl CleaningMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

/// Which row of a duplicate group survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum KeepStrategy {
    /// Keep the earliest row
    #[default]
    First,
    /// Keep the latest row
    Last,
    /// Keep the row with the highest share of non-empty fields (ties keep the earliest)
    MostComplete,
}

/// How the speeder threshold is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SpeederMethod {
    /// Fixed number of seconds
    Absolute,
    /// Value at a percentile of the sorted durations
    Percentile,
    /// Median duration times a multiple
    #[default]
    MedianMultiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutlierMethod {
    /// Interquartile range fences
    #[default]
    Iqr,
    /// Absolute z-score above a threshold
    #[serde(rename = "zscore")]
    ZScore,
}

impl OutlierMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iqr => "iqr",
            Self::ZScore => "zscore",
        }
    }
}

/// What to do with detected outliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutlierAction {
    /// Remove rows holding an outlier
    Remove,
    /// Winsorize the column to its 5th/95th percentiles
    Cap,
    /// Leave values in place and record a warning
    #[default]
    Flag,
}

/// Remediation applied to columns flagged by the missing-data detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MissingDataStrategy {
    #[default]
    Leave,
    ImputeMean,
    ImputeMedian,
    ImputeMode,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DuplicateSettings {
    pub enabled: bool,
    /// Group rows by a respondent-id column when one exists.
    pub compare_by_respondent_id: bool,
    /// Minimum field similarity (0.0 - 1.0) for two rows to count as duplicates.
    pub similarity_threshold: f64,
    pub keep_strategy: KeepStrategy,
    /// Row ceiling for the pairwise similarity pass. Larger datasets skip it.
    pub max_pairwise_rows: usize,
}

impl Default for DuplicateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            compare_by_respondent_id: true,
            similarity_threshold: 0.95,
            keep_strategy: KeepStrategy::First,
            max_pairwise_rows: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeederSettings {
    pub enabled: bool,
    pub method: SpeederMethod,
    /// Seconds, used by [`SpeederMethod::Absolute`].
    pub absolute_threshold: f64,
    /// Percentile (0 - 100), used by [`SpeederMethod::Percentile`].
    pub percentile_threshold: f64,
    /// Multiple of the median, used by [`SpeederMethod::MedianMultiple`].
    pub median_multiple: f64,
}

impl Default for SpeederSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            method: SpeederMethod::MedianMultiple,
            absolute_threshold: 60.0,
            percentile_threshold: 5.0,
            median_multiple: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StraightLinerSettings {
    pub enabled: bool,
    /// Explicit rating columns. `None` auto-detects them from column names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likert_columns: Option<Vec<String>>,
    pub minimum_questions: usize,
    pub variance_threshold: f64,
}

impl Default for StraightLinerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            likert_columns: None,
            minimum_questions: 5,
            variance_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutlierSettings {
    pub enabled: bool,
    pub method: OutlierMethod,
    pub iqr_multiple: f64,
    pub z_score_threshold: f64,
    pub action: OutlierAction,
    /// Restrict detection to these columns. `None` checks every number column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl Default for OutlierSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            method: OutlierMethod::Iqr,
            iqr_multiple: 1.5,
            z_score_threshold: 3.0,
            action: OutlierAction::Flag,
            columns: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MissingDataSettings {
    pub enabled: bool,
    /// Minimum missing percentage (0 - 100) for a column to be reported.
    pub threshold: f64,
    pub strategy: MissingDataStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

impl Default for MissingDataSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 50.0,
            strategy: MissingDataStrategy::Leave,
            columns: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextQualitySettings {
    pub enabled: bool,
    pub detect_gibberish: bool,
    pub minimum_length: usize,
    pub maximum_repeated_chars: usize,
    pub trim_whitespace: bool,
    pub remove_urls: bool,
    pub remove_special_chars: bool,
    /// Leave columns named like respondent ids out of gibberish detection.
    pub skip_identifier_columns: bool,
}

impl Default for TextQualitySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            detect_gibberish: true,
            minimum_length: 2,
            maximum_repeated_chars: 3,
            trim_whitespace: true,
            remove_urls: false,
            remove_special_chars: false,
            skip_identifier_columns: false,
        }
    }
}

/// Settings for one cleaning run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CleaningSettings {
    pub mode: CleaningMode,
    /// Keep an untouched copy of the input in the outcome.
    pub preserve_original: bool,
    pub duplicates: DuplicateSettings,
    pub speeders: SpeederSettings,
    pub straight_liners: StraightLinerSettings,
    pub outliers: OutlierSettings,
    pub missing_data: MissingDataSettings,
    pub text_quality: TextQualitySettings,
}

impl CleaningSettings {
    pub fn builder() -> CleaningSettingsBuilder {
        CleaningSettingsBuilder::default()
    }

    /// Parse settings from JSON; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .context(format!("Failed to read settings file {}", path.display()))?;
        Self::from_json_str(&json)
            .map_err(|e| e.with_context(format!("Invalid settings file {}", path.display())))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(CleaningError::from)
    }

    /// Check every threshold is within its valid range.
    pub fn validate(&self) -> std::result::Result<(), SettingsValidationError> {
        check_range(
            "duplicates.similarityThreshold",
            self.duplicates.similarity_threshold,
            0.0,
            1.0,
        )?;

        check_positive("speeders.absoluteThreshold", self.speeders.absolute_threshold)?;
        check_range(
            "speeders.percentileThreshold",
            self.speeders.percentile_threshold,
            0.0,
            100.0,
        )?;
        check_positive("speeders.medianMultiple", self.speeders.median_multiple)?;

        if self.straight_liners.minimum_questions < 2 {
            return Err(SettingsValidationError::InvalidMinimumQuestions(
                self.straight_liners.minimum_questions,
            ));
        }
        check_non_negative(
            "straightLiners.varianceThreshold",
            self.straight_liners.variance_threshold,
        )?;

        check_positive("outliers.iqrMultiple", self.outliers.iqr_multiple)?;
        check_positive("outliers.zScoreThreshold", self.outliers.z_score_threshold)?;

        check_range("missingData.threshold", self.missing_data.threshold, 0.0, 100.0)?;

        if self.text_quality.maximum_repeated_chars == 0 {
            return Err(SettingsValidationError::NotPositive {
                field: "textQuality.maximumRepeatedChars".to_string(),
                value: 0.0,
            });
        }

        Ok(())
    }
}

fn check_range(
    field: &str,
    value: f64,
    min: f64,
    max: f64,
) -> std::result::Result<(), SettingsValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SettingsValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        })
    }
}

fn check_positive(field: &str, value: f64) -> std::result::Result<(), SettingsValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SettingsValidationError::NotPositive {
            field: field.to_string(),
            value,
        })
    }
}

fn check_non_negative(field: &str, value: f64) -> std::result::Result<(), SettingsValidationError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SettingsValidationError::Negative {
            field: field.to_string(),
            value,
        })
    }
}

/// Errors that can occur during settings validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsValidationError {
    #[error("Invalid value for '{field}': {value} (must be between {min} and {max})")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid value for '{field}': {value} (must be greater than 0)")]
    NotPositive { field: String, value: f64 },

    #[error("Invalid value for '{field}': {value} (must not be negative)")]
    Negative { field: String, value: f64 },

    #[error("Invalid minimum questions: {0} (must be at least 2)")]
    InvalidMinimumQuestions(usize),
}

/// Builder for [`CleaningSettings`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningSettingsBuilder {
    mode: Option<CleaningMode>,
    preserve_original: Option<bool>,
    duplicates: Option<DuplicateSettings>,
    speeders: Option<SpeederSettings>,
    straight_liners: Option<StraightLinerSettings>,
    outliers: Option<OutlierSettings>,
    missing_data: Option<MissingDataSettings>,
    text_quality: Option<TextQualitySettings>,
}

impl CleaningSettingsBuilder {
    /// Start from existing settings instead of the defaults.
    pub fn from_settings(settings: CleaningSettings) -> Self {
        Self {
            mode: Some(settings.mode),
            preserve_original: Some(settings.preserve_original),
            duplicates: Some(settings.duplicates),
            speeders: Some(settings.speeders),
            straight_liners: Some(settings.straight_liners),
            outliers: Some(settings.outliers),
            missing_data: Some(settings.missing_data),
            text_quality: Some(settings.text_quality),
        }
    }

    pub fn mode(mut self, mode: CleaningMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn preserve_original(mut self, preserve: bool) -> Self {
        self.preserve_original = Some(preserve);
        self
    }

    pub fn duplicates(mut self, settings: DuplicateSettings) -> Self {
        self.duplicates = Some(settings);
        self
    }

    pub fn speeders(mut self, settings: SpeederSettings) -> Self {
        self.speeders = Some(settings);
        self
    }

    pub fn straight_liners(mut self, settings: StraightLinerSettings) -> Self {
        self.straight_liners = Some(settings);
        self
    }

    pub fn outliers(mut self, settings: OutlierSettings) -> Self {
        self.outliers = Some(settings);
        self
    }

    pub fn missing_data(mut self, settings: MissingDataSettings) -> Self {
        self.missing_data = Some(settings);
        self
    }

    pub fn text_quality(mut self, settings: TextQualitySettings) -> Self {
        self.text_quality = Some(settings);
        self
    }

    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.duplicates.get_or_insert_with(Default::default).similarity_threshold = threshold;
        self
    }

    pub fn keep_strategy(mut self, strategy: KeepStrategy) -> Self {
        self.duplicates.get_or_insert_with(Default::default).keep_strategy = strategy;
        self
    }

    pub fn speeder_method(mut self, method: SpeederMethod) -> Self {
        self.speeders.get_or_insert_with(Default::default).method = method;
        self
    }

    pub fn percentile_threshold(mut self, percentile: f64) -> Self {
        self.speeders.get_or_insert_with(Default::default).percentile_threshold = percentile;
        self
    }

    pub fn median_multiple(mut self, multiple: f64) -> Self {
        self.speeders.get_or_insert_with(Default::default).median_multiple = multiple;
        self
    }

    pub fn variance_threshold(mut self, threshold: f64) -> Self {
        self.straight_liners.get_or_insert_with(Default::default).variance_threshold = threshold;
        self
    }

    pub fn outlier_method(mut self, method: OutlierMethod) -> Self {
        self.outliers.get_or_insert_with(Default::default).method = method;
        self
    }

    pub fn outlier_action(mut self, action: OutlierAction) -> Self {
        self.outliers.get_or_insert_with(Default::default).action = action;
        self
    }

    pub fn missing_strategy(mut self, strategy: MissingDataStrategy) -> Self {
        self.missing_data.get_or_insert_with(Default::default).strategy = strategy;
        self
    }

    pub fn missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_data.get_or_insert_with(Default::default).threshold = threshold;
        self
    }

    /// Build the settings.
    ///
    /// Returns validated `CleaningSettings` or an error if validation fails.
    pub fn build(self) -> std::result::Result<CleaningSettings, SettingsValidationError> {
        let settings = CleaningSettings {
            mode: self.mode.unwrap_or_default(),
            preserve_original: self.preserve_original.unwrap_or(false),
            duplicates: self.duplicates.unwrap_or_default(),
            speeders: self.speeders.unwrap_or_default(),
            straight_liners: self.straight_liners.unwrap_or_default(),
            outliers: self.outliers.unwrap_or_default(),
            missing_data: self.missing_data.unwrap_or_default(),
            text_quality: self.text_quality.unwrap_or_default(),
        };

        settings.validate()?;
        Ok(settings)
    }
}
