//! Data collaborators: CSV ingest, in-memory storage, cleaning, synthetic series.
//!
//! These produce the [`Series`](crate::domain::Series) the engine consumes.
//! Failures here are reported as [`DataError`] and passed through unchanged
//! by callers.

pub mod cleaning;
pub mod ingest;
pub mod store;
pub mod synthetic;

pub use cleaning::{fill_missing, remove_outliers, FillStrategy};
pub use ingest::{load_csv, read_csv};
pub use store::MemoryStore;
pub use synthetic::random_walk;

use thiserror::Error;

use crate::domain::SeriesError;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: cannot parse timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    #[error("row {row}: cannot parse {column} value '{value}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("malformed series: {0}")]
    Series(#[from] SeriesError),

    #[error("no data for ticker '{ticker}'")]
    NotFound { ticker: String },
}
