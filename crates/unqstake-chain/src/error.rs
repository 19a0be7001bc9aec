//! Error types for chain operations.

use thiserror::Error;
use unqstake_core::AmountError;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid amount: {0}")]
    Amount(#[from] AmountError),

    #[error("{0}")]
    Validation(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Transaction failed: {0}")]
    Transaction(String),
}
