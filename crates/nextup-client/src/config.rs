//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/nextup/config.toml` by default:
//!
//! ```toml
//! debug = false
//!
//! [source]
//! events_file = "/home/me/calendar/events.json"
//!
//! [display]
//! no_meeting_text = "Free"
//! time_format = "12h"
//! ```

use std::path::{Path, PathBuf};

use nextup_core::{DEFAULT_NO_MEETING_TEXT, FormatOptions, TimeFormat};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Project page opened by the About entry.
pub const DEFAULT_ABOUT_URL: &str = "https://github.com/kvendrik/next-up";
/// Calendar web view opened for events without a meeting link.
pub const DEFAULT_CALENDAR_URL: &str = "https://calendar.google.com/calendar/r/week";

/// Configuration for the nextup client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Where calendars and events come from.
    pub source: SourceSettings,

    /// Display settings.
    pub display: DisplaySettings,
}

/// Calendar source settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// JSON file with calendars and events.
    pub events_file: Option<PathBuf>,

    /// Where the selected calendars are stored.
    pub preferences_file: Option<PathBuf>,
}

/// Display settings for the status title and the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Text to show when there are no meetings.
    pub no_meeting_text: String,

    /// Clock style for menu entries, `"24h"` or `"12h"`.
    pub time_format: TimeFormat,

    /// Opened by the About entry.
    pub about_url: String,

    /// Opened when an event without a meeting link is clicked.
    pub calendar_url: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            no_meeting_text: DEFAULT_NO_MEETING_TEXT.to_string(),
            time_format: TimeFormat::default(),
            about_url: DEFAULT_ABOUT_URL.to_string(),
            calendar_url: DEFAULT_CALENDAR_URL.to_string(),
        }
    }
}

impl DisplaySettings {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            no_meeting_text: self.no_meeting_text.clone(),
            time_format: self.time_format,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults when the file
    /// does not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Checks values that parse but cannot work.
    pub fn validate(&self) -> ClientResult<()> {
        for (key, value) in [
            ("display.about_url", &self.display.about_url),
            ("display.calendar_url", &self.display.calendar_url),
        ] {
            Url::parse(value)
                .map_err(|e| ClientError::config(format!("{} is not a valid URL: {}", key, e)))?;
        }
        if self.display.no_meeting_text.trim().is_empty() {
            return Err(ClientError::config("display.no_meeting_text must not be empty"));
        }
        Ok(())
    }

    /// The events file: configured, or `events.json` in the data directory.
    pub fn events_file(&self) -> PathBuf {
        self.source
            .events_file
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("events.json"))
    }

    /// The preferences file: configured, or the server default.
    pub fn preferences_file(&self) -> PathBuf {
        self.source
            .preferences_file
            .clone()
            .unwrap_or_else(nextup_server::Preferences::default_path)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nextup")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nextup")
    }
}
