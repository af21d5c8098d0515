//! CLI error types

use credit_ledger_core_rs::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type CliResult<T> = Result<T, CliError>;
