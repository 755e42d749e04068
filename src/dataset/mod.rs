//! Sales Dataset
//!
//! Loads the retail price CSV into a column-oriented `SalesFrame` with
//! per-column type inference, and extracts the product catalog the optimizer
//! consumes.

mod catalog;
mod frame;
mod loader;

pub use catalog::build_catalog;
pub use frame::{Column, ColumnData, DType, SalesFrame};
pub use loader::{load_csv, read_csv};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset has no columns")]
    Empty,

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    #[error("Column '{0}' is not text")]
    NotText(String),

    #[error("Column '{name}' has {got} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("Unparsable date '{value}' in column '{column}' (expected format {format})")]
    BadDate {
        column: String,
        value: String,
        format: String,
    },
}
