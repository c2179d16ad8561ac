//! Typed tabular dataset consumed by every detector.
//!
//! A [`Dataset`] is an ordered list of [`Column`]s plus an ordered list of
//! [`Row`]s. Row order is significant: every row index reported anywhere in
//! the crate is a position in [`Dataset::rows`].
//!
//! Cell values are tagged once, at ingestion time, by
//! [`CellValue::from_raw`], so detectors branch on a closed set of variants
//! instead of re-parsing strings.

use crate::error::{CleaningError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Text values that count as missing in addition to [`CellValue::Empty`].
pub const MISSING_MARKERS: [&str; 3] = ["", "N/A", "null"];

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Categorical,
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Categorical => "categorical",
            Self::Date => "date",
        }
    }
}

impl std::str::FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "number" | "numeric" => Ok(Self::Number),
            "categorical" | "category" => Ok(Self::Categorical),
            "date" | "datetime" => Ok(Self::Date),
            other => Err(format!("unknown column type '{}'", other)),
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Number)
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Categorical)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Date)
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Numeric(f64),
    Text(String),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// Tag a raw textual value according to the column it belongs to.
    ///
    /// Blank input becomes [`CellValue::Empty`]. Number and categorical
    /// columns store values that parse as finite numbers as
    /// [`CellValue::Numeric`]; everything else keeps its original text.
    pub fn from_raw(raw: &str, column_type: ColumnType) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match column_type {
            ColumnType::Number | ColumnType::Categorical => match trimmed.parse::<f64>() {
                Ok(value) if value.is_finite() => Self::Numeric(value),
                _ => Self::Text(raw.to_string()),
            },
            ColumnType::Text | ColumnType::Date => Self::Text(raw.to_string()),
        }
    }

    /// Missing means empty, or one of the [`MISSING_MARKERS`].
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Numeric(_) => false,
            Self::Text(s) => MISSING_MARKERS.contains(&s.as_str()),
        }
    }

    /// Empty, or text consisting only of whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Numeric(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    /// Neither blank nor missing.
    pub fn has_content(&self) -> bool {
        !self.is_blank() && !self.is_missing()
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Numeric(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Numeric(value) => write!(f, "{}", value),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One record: column name to cell. Absent columns read as [`CellValue::Empty`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> &CellValue {
        self.0.get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        self.0.insert(column.into(), value);
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.set(column, value.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Share of `columns` holding a value with content (0.0 - 1.0).
    pub fn completeness(&self, columns: &[Column]) -> f64 {
        if columns.is_empty() {
            return 0.0;
        }
        let filled = columns
            .iter()
            .filter(|c| self.get(&c.name).has_content())
            .count();
        filled as f64 / columns.len() as f64
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Columns plus positionally indexed rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset, checking that it is structurally well formed.
    pub fn new(columns: Vec<Column>, rows: Vec<Row>) -> Result<Self> {
        let dataset = Self { columns, rows };
        dataset.validate()?;
        Ok(dataset)
    }

    /// Build a dataset from raw text records laid out in column order.
    pub fn from_records<R, S>(columns: Vec<Column>, records: &[R]) -> Result<Self>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let record = record.as_ref();
            if record.len() != columns.len() {
                return Err(CleaningError::InvalidDataset(format!(
                    "record {} has {} fields, expected {}",
                    index,
                    record.len(),
                    columns.len()
                )));
            }
            let mut row = Row::new();
            for (column, raw) in columns.iter().zip(record) {
                let cell = CellValue::from_raw(raw.as_ref(), column.column_type);
                if cell != CellValue::Empty {
                    row.set(column.name.clone(), cell);
                }
            }
            rows.push(row);
        }
        Self::new(columns, rows)
    }

    /// Check column names are unique and non-empty and rows only use known columns.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(CleaningError::InvalidDataset(
                    "column names must not be empty".to_string(),
                ));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(CleaningError::InvalidDataset(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        for (index, row) in self.rows.iter().enumerate() {
            if let Some((field, _)) = row.fields().find(|(field, _)| !seen.contains(field)) {
                return Err(CleaningError::InvalidDataset(format!(
                    "row {} references unknown column '{}'",
                    index, field
                )));
            }
        }
        Ok(())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column, failing with [`CleaningError::ColumnNotFound`].
    pub fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name)
            .ok_or_else(|| CleaningError::ColumnNotFound(name.to_string()))
    }

    pub fn columns_of_type(&self, column_type: ColumnType) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(move |c| c.column_type == column_type)
    }

    /// Numeric cells of a column as `(row_index, value)` pairs.
    pub fn numeric_values(&self, column: &str) -> Vec<(usize, f64)> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| row.get(column).as_number().map(|v| (index, v)))
            .collect()
    }

    pub fn into_parts(self) -> (Vec<Column>, Vec<Row>) {
        (self.columns, self.rows)
    }

    /// Rebuild from parts already known to be consistent.
    pub(crate) fn from_parts_unchecked(columns: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }
}
