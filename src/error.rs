use thiserror::Error;

/// Why a KPI file could not be turned into a [`crate::dataset::Dataset`].
///
/// `row` is the 1-based data row, not counting the header line.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("row {row}: missing value for {column}")]
    MissingField { row: usize, column: String },

    #[error("row {row}: unparseable date {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: unparseable {column} value {value:?}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;
