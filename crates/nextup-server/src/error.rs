//! Server error types.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while reading calendars or preferences.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error reading or writing a file.
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The event file is not valid JSON or has the wrong shape.
    #[error("invalid event file {path}: {source}")]
    EventFile {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The preferences file could not be parsed.
    #[error("invalid preferences file {path}: {source}")]
    Preferences {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// The preferences could not be serialized.
    #[error("failed to encode preferences: {0}")]
    PreferencesEncode(#[from] toml::ser::Error),

    /// A calendar id that the source does not know about.
    #[error("unknown calendar: {id}")]
    UnknownCalendar { id: String },
}

impl ServerError {
    /// Creates an IO error for `path`.
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Creates an event file error for `path`.
    pub fn event_file(path: &Path, source: serde_json::Error) -> Self {
        Self::EventFile {
            path: path.display().to_string(),
            source,
        }
    }

    /// Creates a preferences parse error for `path`.
    pub fn preferences(path: &Path, source: toml::de::Error) -> Self {
        Self::Preferences {
            path: path.display().to_string(),
            source,
        }
    }

    /// Creates an unknown calendar error.
    pub fn unknown_calendar(id: impl Into<String>) -> Self {
        Self::UnknownCalendar { id: id.into() }
    }
}
