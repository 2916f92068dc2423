//! The `nextup` command-line interface.
//!
//! Prints the status title and menu of the next calendar event, keeps them
//! up to date in `watch` mode and opens meeting links.

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
