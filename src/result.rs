//! # result
//!
//! Values returned to scripts for each operation

use crate::error::ClientError;
use crate::utils::fmt::tag_error;

/// Message used when an operation is issued on a client without a mounted share
pub const NOT_INITIALIZED: &str = "client not initialized";

/// Outcome of a single client operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
}

impl OperationResult {
    /// Successful result with a confirmation message
    pub fn ok<S: AsRef<str>>(message: S) -> Self {
        Self {
            success: true,
            message: message.as_ref().to_string(),
        }
    }

    /// Failed result carrying `message` verbatim
    pub fn failed<S: AsRef<str>>(message: S) -> Self {
        Self {
            success: false,
            message: message.as_ref().to_string(),
        }
    }

    /// Failed result carrying the sentinel tagged text of `err`
    pub fn from_error<E: ToString>(err: E) -> Self {
        Self {
            success: false,
            message: tag_error(err),
        }
    }

    pub fn not_initialized() -> Self {
        Self::failed(NOT_INITIALIZED)
    }
}

impl From<ClientError> for OperationResult {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotInitialized => Self::not_initialized(),
            err => Self::from_error(err),
        }
    }
}

/// Result of a share enumeration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharesListResult {
    pub success: bool,
    pub message: String,
    /// Share names in server order; `None` unless `success`
    pub shares: Option<Vec<String>>,
}

impl SharesListResult {
    pub fn ok(shares: Vec<String>) -> Self {
        Self {
            success: true,
            message: String::new(),
            shares: Some(shares),
        }
    }

    pub fn failed(result: OperationResult) -> Self {
        Self {
            success: false,
            message: result.message,
            shares: None,
        }
    }
}
