//! Logging setup shared by the `nextup` binary and the refresh loop.
//!
//! Logs always go to stderr so stdout only ever carries status lines.
//!
//! ```ignore
//! use nextup_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::watch())?;
//! ```

use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*, registry::LookupSpan};

/// Crates whose logs are enabled by the default filter.
const TARGETS: [&str; 4] = ["nextup", "nextup_core", "nextup_server", "nextup_client"];

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// A global subscriber was already installed
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// How log lines are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable
    Pretty,
    /// One line per event
    #[default]
    Compact,
    /// One JSON object per event, for the long-running watch loop
    Json,
}

/// Logging options.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for the `nextup_*` crates when `RUST_LOG` is not set
    pub level: Level,
    pub format: LogFormat,
    /// Include target, file and line
    pub verbose: bool,
    /// Include timestamps (compact format only; the others always have them)
    pub timestamps: bool,
    /// Explicit filter directive, takes precedence over `RUST_LOG`
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    /// Warnings only, compact, without timestamps.
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            verbose: false,
            timestamps: false,
            filter: None,
        }
    }
}

impl TracingConfig {
    /// `--debug`: everything from our crates, with source locations.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            verbose: true,
            ..Self::default()
        }
    }

    /// The `watch` loop: info and above as JSON.
    #[must_use]
    pub fn watch() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Json,
            verbose: true,
            timestamps: true,
            filter: None,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// The explicit filter, else `RUST_LOG`, else [`default_directive`].
    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(filter) = &self.filter {
            return Ok(EnvFilter::try_new(filter)?);
        }
        Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(self.level))))
    }

    fn layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(self.verbose)
            .with_file(self.verbose)
            .with_line_number(self.verbose);

        match (self.format, self.timestamps) {
            (LogFormat::Pretty, _) => layer.pretty().boxed(),
            (LogFormat::Json, _) => layer.json().boxed(),
            (LogFormat::Compact, true) => layer.compact().boxed(),
            (LogFormat::Compact, false) => layer.compact().without_time().boxed(),
        }
    }
}

/// Installs the global subscriber. Call once at startup.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed or if the filter
/// directive does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    tracing_subscriber::registry()
        .with(config.env_filter()?)
        .with(config.layer())
        .try_init()?;
    Ok(())
}

/// Filter directive enabling every `nextup_*` crate at `level`.
fn default_directive(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}
