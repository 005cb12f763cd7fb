//! The module contains the errors the engine can return.
//!
//! Every error is recoverable: the caller surfaces the message and may retry
//! with corrected input. No operation applies partially, so an error always
//! means that nothing was committed.
//!
//! - [`InsufficientBalance`] thrown when a debit exceeds the current balance.
//! - [`UnknownUser`] thrown when a user id is not in the roster.
//! - [`UnauthorizedAction`] thrown when an employer acts outside its roster.
//!
//!  [`InsufficientBalance`]: EngineError::InsufficientBalance
//!  [`UnknownUser`]: EngineError::UnknownUser
//!  [`UnauthorizedAction`]: EngineError::UnauthorizedAction
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid cart: {0}")]
    InvalidCart(String),
    #[error("Exceeds scheme limit: {0}")]
    ExceedsSchemeLimit(String),
    #[error("Unknown user: {0}")]
    UnknownUser(String),
    #[error("Unauthorized action: {0}")]
    UnauthorizedAction(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Checkout already in progress: {0}")]
    CheckoutInProgress(String),
    #[error("Invalid catalog: {0}")]
    Catalog(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(value: serde_json::Error) -> Self {
        Self::Catalog(value.to_string())
    }
}
