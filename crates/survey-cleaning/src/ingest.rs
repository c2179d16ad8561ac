//! Conversion between polars `DataFrame`s and [`Dataset`]s.
//!
//! Column types are inferred from the polars dtype unless overridden:
//!
//! | dtype                    | column type                                      |
//! |--------------------------|--------------------------------------------------|
//! | integer / float          | number (categorical for small Likert-named ints) |
//! | date / datetime / time   | date                                             |
//! | boolean                  | categorical                                      |
//! | string                   | categorical if few distinct values, else text    |

use crate::dataset::{CellValue, Column, ColumnType, Dataset};
use crate::error::{CleaningError, Result, ResultExt};
use crate::heuristics::NameHeuristics;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// String columns with at most this many distinct values may be categorical.
const MAX_CATEGORICAL_DISTINCT: usize = 20;

/// ...and only if distinct values make up at most this share of non-null values.
const MAX_CATEGORICAL_RATIO: f64 = 0.5;

/// Integer rating scales rarely exceed 0-10.
const MAX_LIKERT_POINTS: usize = 11;

/// Category of a polars dtype for type inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DtypeCategory {
    Integer,
    Float,
    Datetime,
    Boolean,
    String,
    Other,
}

fn dtype_category(dtype: &DataType) -> DtypeCategory {
    match dtype {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DtypeCategory::Integer,
        DataType::Float32 | DataType::Float64 => DtypeCategory::Float,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time => DtypeCategory::Datetime,
        DataType::Boolean => DtypeCategory::Boolean,
        DataType::String | DataType::Categorical(_, _) => DtypeCategory::String,
        _ => DtypeCategory::Other,
    }
}

/// Explicit column types that win over inference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTypeOverrides(BTreeMap<String, ColumnType>);

impl ColumnTypeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        self.0.insert(column.into(), column_type);
        self
    }

    /// Parse `name=type` pairs, e.g. `"Q1=categorical"`.
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let mut overrides = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, kind) = pair.rsplit_once('=').ok_or_else(|| {
                CleaningError::InvalidDataset(format!(
                    "column type override '{}' must look like name=type",
                    pair
                ))
            })?;
            let column_type = kind
                .parse::<ColumnType>()
                .map_err(CleaningError::InvalidDataset)?;
            overrides.0.insert(name.trim().to_string(), column_type);
        }
        Ok(overrides)
    }

    pub fn get(&self, column: &str) -> Option<ColumnType> {
        self.0.get(column).copied()
    }
}

/// Infer the column type of `series`.
pub fn infer_column_type(series: &Series, heuristics: &NameHeuristics) -> Result<ColumnType> {
    let column_type = match dtype_category(series.dtype()) {
        DtypeCategory::Integer => {
            let distinct = series.n_unique()?.saturating_sub(usize::from(series.null_count() > 0));
            if (heuristics.likert)(series.name().as_str()) && distinct <= MAX_LIKERT_POINTS {
                ColumnType::Categorical
            } else {
                ColumnType::Number
            }
        }
        DtypeCategory::Float => ColumnType::Number,
        DtypeCategory::Datetime => ColumnType::Date,
        DtypeCategory::Boolean => ColumnType::Categorical,
        DtypeCategory::String => {
            let strings = series.cast(&DataType::String)?;
            let values: Vec<&str> = strings
                .str()?
                .into_iter()
                .flatten()
                .filter(|s| !s.trim().is_empty())
                .collect();
            let distinct: BTreeSet<&str> = values.iter().copied().collect();
            if !values.is_empty()
                && distinct.len() <= MAX_CATEGORICAL_DISTINCT
                && distinct.len() as f64 / values.len() as f64 <= MAX_CATEGORICAL_RATIO
            {
                ColumnType::Categorical
            } else {
                ColumnType::Text
            }
        }
        DtypeCategory::Other => ColumnType::Text,
    };
    Ok(column_type)
}

/// Convert a polars `DataFrame` into a [`Dataset`].
pub fn dataset_from_dataframe(df: &DataFrame, overrides: &ColumnTypeOverrides) -> Result<Dataset> {
    let heuristics = NameHeuristics::default();
    let mut columns = Vec::with_capacity(df.width());
    let mut raw_columns: Vec<Vec<Option<String>>> = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let name = series.name().to_string();
        let column_type = match overrides.get(&name) {
            Some(column_type) => column_type,
            None => infer_column_type(series, &heuristics)
                .context(format!("Failed to infer type of '{}'", name))?,
        };
        debug!("Column '{}' ({}) -> {}", name, series.dtype(), column_type.as_str());

        let strings = series
            .cast(&DataType::String)
            .context(format!("Failed to read '{}'", name))?;
        raw_columns.push(
            strings
                .str()?
                .into_iter()
                .map(|value| value.map(str::to_string))
                .collect(),
        );
        columns.push(Column::new(name, column_type));
    }

    let records: Vec<Vec<String>> = (0..df.height())
        .map(|row| {
            raw_columns
                .iter()
                .map(|values| values[row].clone().unwrap_or_default())
                .collect()
        })
        .collect();

    Dataset::from_records(columns, &records)
}

/// Convert a [`Dataset`] back into a polars `DataFrame`.
///
/// Number columns whose values are all numeric become `Float64`; every other
/// column is written as strings. Missing cells become nulls.
pub fn dataset_to_dataframe(dataset: &Dataset) -> Result<DataFrame> {
    let mut series = Vec::with_capacity(dataset.column_count());

    for column in dataset.columns() {
        let cells: Vec<&CellValue> = dataset.rows().iter().map(|r| r.get(&column.name)).collect();
        let all_numeric = cells
            .iter()
            .all(|cell| cell.is_blank() || cell.as_number().is_some());

        let s = if column.column_type == ColumnType::Number && all_numeric {
            let values: Vec<Option<f64>> = cells.iter().map(|cell| cell.as_number()).collect();
            Series::new(column.name.as_str().into(), values)
        } else {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|cell| (!cell.is_blank()).then(|| cell.to_string()))
                .collect();
            Series::new(column.name.as_str().into(), values)
        };
        series.push(s.into_column());
    }

    Ok(DataFrame::new(series)?)
}

/// Load a CSV file with a header row into a [`Dataset`].
pub fn read_csv(path: impl AsRef<Path>, overrides: &ColumnTypeOverrides) -> Result<Dataset> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to parse {}", path.display()))?;

    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    dataset_from_dataframe(&df, overrides)
}

/// Write `dataset` to `path` as CSV with a header row.
pub fn write_csv(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut df = dataset_to_dataframe(dataset)?;
    let mut file =
        File::create(path).context(format!("Failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .context(format!("Failed to write {}", path.display()))?;
    info!("Saved {} rows to {}", dataset.row_count(), path.display());
    Ok(())
}
