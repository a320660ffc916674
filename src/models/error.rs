use thiserror::Error;

/// Input validation failures. Everything past validation degrades to empty results instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("required column '{column}' is missing on row {row}")]
    MissingColumn { column: &'static str, row: usize },

    #[error("unparseable date '{value}' on row {row}")]
    UnparseableDate { value: String, row: usize },

    #[error("duplicate date {date}")]
    DuplicateDate { date: String },

    #[error("column '{column}' holds a non-finite value on row {row}")]
    NonFiniteValue { column: &'static str, row: usize },
}
