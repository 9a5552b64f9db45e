//! # error
//!
//! Client error taxonomy

use remotefs::RemoteError;
use thiserror::Error;

use crate::result::NOT_INITIALIZED;
use crate::utils::fmt::tag_error;

/// Errors raised by the smb client.
///
/// The `Display` representation is always tagged with [`crate::ERROR_SENTINEL`].
#[derive(Error, Debug)]
pub enum ClientError {
    /// The transport connection to the server could not be opened
    #[error("{}", tag_error(format!("connection failed: {}", .0)))]
    Connection(RemoteError),
    /// The server rejected the credentials or the handshake failed
    #[error("{}", tag_error(format!("authentication failed: {}", .0)))]
    Auth(RemoteError),
    /// The share does not exist or is not accessible
    #[error("{}", tag_error(format!("could not mount share: {}", .0)))]
    Mount(RemoteError),
    /// The operation was issued on a client which holds no mounted share
    #[error("{}", tag_error(NOT_INITIALIZED))]
    NotInitialized,
    /// An I/O operation on the mounted share failed
    #[error("{}", tag_error(.0))]
    Operation(RemoteError),
}

impl ClientError {
    /// Underlying protocol error, if any
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Connection(e) | Self::Auth(e) | Self::Mount(e) | Self::Operation(e) => Some(e),
            Self::NotInitialized => None,
        }
    }
}
