//! Statistical imputation methods.
//!
//! Provides mean, median and mode fill values. Number columns use the
//! numeric statistic; every other column type always uses the mode.

use crate::config::MissingDataStrategy;
use crate::dataset::{CellValue, Column, ColumnType, Row};
use crate::stats;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Compute the column-level fill value for an impute strategy.
    ///
    /// Returns `None` for non-impute strategies and for columns without any
    /// usable value.
    pub fn fill_value(
        rows: &[Row],
        column: &Column,
        strategy: MissingDataStrategy,
    ) -> Option<CellValue> {
        let numeric = column.column_type == ColumnType::Number;
        match strategy {
            MissingDataStrategy::ImputeMean if numeric => {
                stats::mean(&Self::numeric_values(rows, &column.name)).map(CellValue::Numeric)
            }
            MissingDataStrategy::ImputeMedian if numeric => {
                stats::median(&Self::numeric_values(rows, &column.name)).map(CellValue::Numeric)
            }
            MissingDataStrategy::ImputeMode if numeric => {
                stats::numeric_mode(&Self::numeric_values(rows, &column.name))
                    .map(CellValue::Numeric)
            }
            MissingDataStrategy::ImputeMean
            | MissingDataStrategy::ImputeMedian
            | MissingDataStrategy::ImputeMode => Self::mode(rows, &column.name),
            MissingDataStrategy::Leave | MissingDataStrategy::Remove => None,
        }
    }

    /// Most frequent non-missing cell, compared by its display form.
    pub fn mode(rows: &[Row], column: &str) -> Option<CellValue> {
        stats::mode_by(
            rows.iter()
                .map(|row| row.get(column))
                .filter(|cell| !cell.is_missing()),
            |cell| cell.to_string(),
        )
        .cloned()
    }

    /// Replace every missing cell of `column` with `fill`.
    ///
    /// Returns the positions (within `rows`) of the cells that were filled.
    pub fn fill_missing(rows: &mut [Row], column: &str, fill: &CellValue) -> Vec<usize> {
        let mut filled = Vec::new();
        for (position, row) in rows.iter_mut().enumerate() {
            if row.get(column).is_missing() {
                row.set(column, fill.clone());
                filled.push(position);
            }
        }
        filled
    }

    fn numeric_values(rows: &[Row], column: &str) -> Vec<f64> {
        rows.iter()
            .filter_map(|row| row.get(column).as_number())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age_rows() -> Vec<Row> {
        vec![
            Row::new().with("Age", 20.0),
            Row::new(),
            Row::new().with("Age", 30.0),
            Row::new().with("Age", "N/A"),
            Row::new().with("Age", 30.0),
            Row::new().with("Age", 100.0),
        ]
    }

    #[test]
    fn test_numeric_fill_values() {
        let rows = age_rows();
        let column = Column::number("Age");
        assert_eq!(
            StatisticalImputer::fill_value(&rows, &column, MissingDataStrategy::ImputeMean),
            Some(CellValue::Numeric(45.0))
        );
        assert_eq!(
            StatisticalImputer::fill_value(&rows, &column, MissingDataStrategy::ImputeMedian),
            Some(CellValue::Numeric(30.0))
        );
        assert_eq!(
            StatisticalImputer::fill_value(&rows, &column, MissingDataStrategy::ImputeMode),
            Some(CellValue::Numeric(30.0))
        );
        assert_eq!(
            StatisticalImputer::fill_value(&rows, &column, MissingDataStrategy::Leave),
            None
        );
    }

    #[test]
    fn test_categorical_always_uses_mode() {
        let rows = vec![
            Row::new().with("Region", "North"),
            Row::new().with("Region", "South"),
            Row::new().with("Region", "South"),
            Row::new(),
            Row::new().with("Region", "null"),
            Row::new().with("Region", "null"),
            Row::new().with("Region", "null"),
        ];
        let column = Column::categorical("Region");
        assert_eq!(
            StatisticalImputer::fill_value(&rows, &column, MissingDataStrategy::ImputeMean),
            Some(CellValue::from("South"))
        );
    }

    #[test]
    fn test_all_missing_has_no_fill_value() {
        let rows = vec![Row::new(), Row::new().with("Age", "N/A")];
        let column = Column::number("Age");
        assert_eq!(
            StatisticalImputer::fill_value(&rows, &column, MissingDataStrategy::ImputeMedian),
            None
        );
    }

    #[test]
    fn test_fill_missing_reports_positions() {
        let mut rows = age_rows();
        let filled = StatisticalImputer::fill_missing(&mut rows, "Age", &CellValue::Numeric(30.0));
        assert_eq!(filled, vec![1, 3]);
        assert!(rows.iter().all(|row| !row.get("Age").is_missing()));
        assert_eq!(rows[3].get("Age"), &CellValue::Numeric(30.0));
    }
}
