//! Calendar source, preferences and the countdown refresh loop.
//!
//! This crate drives the core selector over time:
//! - [`EventSource`] lists calendars and fetches the rest of today's events
//! - [`Preferences`] persists which calendars are watched
//! - [`RefreshState`] decides what a timer tick changes
//! - [`Ticker`] owns the single repeating timer
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use nextup_server::{JsonFileSource, Ticker, TickerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = Arc::new(JsonFileSource::new("events.json"));
//!     let ticker = Ticker::new(TickerConfig::default(), source, vec!["work".into()]);
//!     ticker.run(|update| println!("{}", update.status)).await;
//! }
//! ```

mod error;
mod preferences;
mod refresh;
mod source;
mod ticker;

pub use error::{ServerError, ServerResult};
pub use preferences::Preferences;
pub use refresh::{Change, RefreshOutcome, RefreshState, TimerCommand};
pub use source::{EventFile, EventSource, JsonFileSource, StaticSource, events_in_window};
pub use ticker::{
    Clock, DayBoundary, SharedTickerState, StatusUpdate, SystemClock, Ticker, TickerCommand,
    TickerConfig, TickerHandle, TickerState, today_events,
};
