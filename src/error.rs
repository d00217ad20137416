//! Account errors. Collaborator failures pass through these variants untouched.

use crate::core::trinary::TrinaryError;
use thiserror::Error;

pub type AccountResult<T> = Result<T, AccountError>;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Seed unavailable: {0}")]
    Seed(String),

    #[error("Client construction failed: {0}")]
    ClientConstruction(String),

    #[error("Node request failed: {0}")]
    Api(String),

    #[error("Invalid trytes: {0}")]
    Trinary(#[from] TrinaryError),

    #[error("Invalid security level: {0}")]
    InvalidSecurityLevel(u8),

    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),

    #[error("Insufficient balance: need {needed}, usable {available}")]
    InsufficientBalance { needed: u64, available: u64 },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Pending transfer not found: {0}")]
    PendingTransferNotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Time source error: {0}")]
    Time(String),

    #[error("Plugin '{name}' failed: {reason}")]
    Plugin { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AccountError {
    fn from(err: reqwest::Error) -> Self {
        AccountError::Api(err.to_string())
    }
}

impl From<serde_json::Error> for AccountError {
    fn from(err: serde_json::Error) -> Self {
        AccountError::Config(err.to_string())
    }
}
