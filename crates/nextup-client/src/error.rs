//! Client error types.

use nextup_server::ServerError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading calendars or preferences failed.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Watching the events or preferences file failed.
    #[error("file watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Action failed (open, join, etc).
    #[error("action failed: {0}")]
    Action(String),
}

impl ClientError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn action(msg: impl Into<String>) -> Self {
        Self::Action(msg.into())
    }
}
