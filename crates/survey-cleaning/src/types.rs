use crate::config::{CleaningSettings, OutlierMethod};
use crate::dataset::Dataset;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Detectors and issue records
// ============================================================================

/// The six detectors, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Detector {
    Duplicates,
    Speeders,
    StraightLiners,
    Outliers,
    MissingData,
    TextQuality,
}

impl Detector {
    pub const ALL: [Detector; 6] = [
        Self::Duplicates,
        Self::Speeders,
        Self::StraightLiners,
        Self::Outliers,
        Self::MissingData,
        Self::TextQuality,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Duplicates => "duplicates",
            Self::Speeders => "speeders",
            Self::StraightLiners => "straight-liners",
            Self::Outliers => "outliers",
            Self::MissingData => "missing-data",
            Self::TextQuality => "text-quality",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Duplicates => "Duplicates",
            Self::Speeders => "Speeders",
            Self::StraightLiners => "Straight-liners",
            Self::Outliers => "Outliers",
            Self::MissingData => "Missing Data",
            Self::TextQuality => "Text Quality",
        }
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A group of rows considered the same response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateIssue {
    pub group_id: String,
    pub row_indices: Vec<usize>,
    /// 1.0 for respondent-id matches, otherwise the field similarity.
    pub similarity: f64,
}

/// A response completed implausibly fast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeederIssue {
    pub row_index: usize,
    pub column: String,
    /// Seconds.
    pub completion_time: f64,
    pub threshold: f64,
    /// Share of valid responses that were faster (0 - 100).
    pub percentile: f64,
}

/// A response giving (nearly) the same answer to every rating question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StraightLinerIssue {
    pub row_index: usize,
    pub columns: Vec<String>,
    pub variance: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlierIssue {
    pub row_index: usize,
    pub column: String,
    pub value: f64,
    pub method: OutlierMethod,
    /// Z-score of the value regardless of the detection method (0 when the column has no variance).
    pub score: f64,
}

/// A column whose share of missing values reached the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingDataIssue {
    pub column: String,
    pub row_indices: Vec<usize>,
    pub missing_count: usize,
    pub total_count: usize,
    pub missing_percentage: f64,
}

/// Named text-quality problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextProblem {
    TooShort,
    RepeatedChars,
    SingleCharRepeated,
    KeyboardMashing,
    NoVowels,
    UnusualConsonantRatio,
}

impl TextProblem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TooShort => "too-short",
            Self::RepeatedChars => "repeated-chars",
            Self::SingleCharRepeated => "single-char-repeated",
            Self::KeyboardMashing => "keyboard-mashing",
            Self::NoVowels => "no-vowels",
            Self::UnusualConsonantRatio => "unusual-consonant-ratio",
        }
    }
}

impl fmt::Display for TextProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextIssue {
    pub row_index: usize,
    pub column: String,
    pub value: String,
    pub problems: Vec<TextProblem>,
}

/// Issues found by every detector in one pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedIssues {
    pub duplicates: Vec<DuplicateIssue>,
    pub speeders: Vec<SpeederIssue>,
    pub straight_liners: Vec<StraightLinerIssue>,
    pub outliers: Vec<OutlierIssue>,
    pub missing_data: Vec<MissingDataIssue>,
    pub text_quality: Vec<TextIssue>,
}

impl DetectedIssues {
    pub fn count(&self, detector: Detector) -> usize {
        match detector {
            Detector::Duplicates => self.duplicates.len(),
            Detector::Speeders => self.speeders.len(),
            Detector::StraightLiners => self.straight_liners.len(),
            Detector::Outliers => self.outliers.len(),
            Detector::MissingData => self.missing_data.len(),
            Detector::TextQuality => self.text_quality.len(),
        }
    }

    pub fn total_count(&self) -> usize {
        Detector::ALL.iter().map(|d| self.count(*d)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Distinct rows referenced by any row-level issue (missing data is per column).
    pub fn flagged_rows(&self) -> BTreeSet<usize> {
        let mut rows = BTreeSet::new();
        for issue in &self.duplicates {
            rows.extend(issue.row_indices.iter().copied());
        }
        rows.extend(self.speeders.iter().map(|i| i.row_index));
        rows.extend(self.straight_liners.iter().map(|i| i.row_index));
        rows.extend(self.outliers.iter().map(|i| i.row_index));
        rows.extend(self.text_quality.iter().map(|i| i.row_index));
        rows
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Kinds of mutation the cleaner can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionType {
    TextCleaned,
    ValuesImputed,
    RowsRemovedMissing,
    DuplicatesRemoved,
    SpeedersRemoved,
    StraightLinersRemoved,
    OutliersRemoved,
    OutliersCapped,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TextCleaned => "Text Cleaned",
            Self::ValuesImputed => "Values Imputed",
            Self::RowsRemovedMissing => "Rows Removed (Missing Data)",
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::SpeedersRemoved => "Speeders Removed",
            Self::StraightLinersRemoved => "Straight-liners Removed",
            Self::OutliersRemoved => "Outliers Removed",
            Self::OutliersCapped => "Outliers Capped",
        }
    }

    /// Whether `affected.count` is a number of removed rows.
    pub fn removes_rows(&self) -> bool {
        matches!(
            self,
            Self::RowsRemovedMissing
                | Self::DuplicatesRemoved
                | Self::SpeedersRemoved
                | Self::StraightLinersRemoved
                | Self::OutliersRemoved
        )
    }
}

/// What an action touched. Row indices always refer to the original dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AffectedSummary {
    pub rows: Vec<usize>,
    pub columns: Vec<String>,
    /// Rows removed, rows changed or cells changed, depending on the action type.
    pub count: usize,
}

/// A single mutation applied to the working copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningAction {
    pub action_type: ActionType,
    pub description: String,
    pub affected: AffectedSummary,
}

impl CleaningAction {
    pub fn new(
        action_type: ActionType,
        description: impl Into<String>,
        affected: AffectedSummary,
    ) -> Self {
        Self {
            action_type,
            description: description.into(),
            affected,
        }
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningSummary {
    pub original_rows: usize,
    pub original_columns: usize,
    pub final_rows: usize,
    pub final_columns: usize,
    pub rows_removed: usize,
    pub rows_flagged: usize,
    pub columns_modified: Vec<String>,
    pub values_imputed: usize,
}

impl CleaningSummary {
    /// Calculate the percentage of rows removed.
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.original_rows == 0 {
            0.0
        } else {
            self.rows_removed as f64 / self.original_rows as f64 * 100.0
        }
    }
}

/// Immutable audit trail of one cleaning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningReport {
    pub timestamp: DateTime<Utc>,
    pub settings: CleaningSettings,
    pub summary: CleaningSummary,
    pub issues: DetectedIssues,
    pub actions: Vec<CleaningAction>,
    pub execution_time_ms: u64,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CleaningReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Human-readable summary, one line per fact.
    pub fn summary_lines(&self) -> Vec<String> {
        let s = &self.summary;
        let mut lines = vec![
            format!(
                "Rows: {} -> {} ({} removed, {:.1}%)",
                s.original_rows,
                s.final_rows,
                s.rows_removed,
                s.rows_removed_percentage()
            ),
            format!("Columns: {} -> {}", s.original_columns, s.final_columns),
            format!("Issues detected: {}", self.issues.total_count()),
            format!("Rows flagged: {}", s.rows_flagged),
            format!("Actions applied: {}", self.actions.len()),
        ];
        if s.values_imputed > 0 {
            lines.push(format!("Values imputed: {}", s.values_imputed));
        }
        if !s.columns_modified.is_empty() {
            lines.push(format!("Columns modified: {}", s.columns_modified.join(", ")));
        }
        if !self.warnings.is_empty() {
            lines.push(format!("Warnings: {}", self.warnings.len()));
        }
        if !self.errors.is_empty() {
            lines.push(format!("Errors: {}", self.errors.len()));
        }
        lines
    }
}

/// Result of [`crate::AutoCleaner::run`].
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub cleaned: Dataset,
    /// Untouched input, kept when `preserveOriginal` is set.
    pub original: Option<Dataset>,
    pub report: CleaningReport,
}

// ============================================================================
// Tests
// ============================================================================
