use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Failed to read trade log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Required column '{column}' (for {field}) not found; available columns: {available:?}")]
    MissingColumn {
        field: &'static str,
        column: String,
        available: Vec<String>,
    },

    #[error("Trade log has no header row")]
    EmptyInput,

    #[error("Invalid input: {0}")]
    Core(#[from] core_types::CoreError),
}
