//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// nextup - what's next on your calendar today
#[derive(Debug, Parser)]
#[command(name = "nextup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "NEXTUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON file with calendars and events (overrides the config)
    #[arg(long, env = "NEXTUP_EVENTS")]
    pub events: Option<PathBuf>,

    /// Preferences file with the selected calendars (overrides the config)
    #[arg(long, env = "NEXTUP_PREFERENCES")]
    pub preferences: Option<PathBuf>,

    /// Text to show when there are no meetings (overrides the config)
    #[arg(long)]
    pub no_meeting_text: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Print the status title (default)
    Status,

    /// Print the menu
    Menu {
        /// Output the menu model as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep the status up to date, printing every change
    Watch,

    /// Open the meeting link of the event shown in the status
    Join,

    /// Activate the Nth event of the menu (1-based)
    Open {
        /// Position in the menu's event list
        position: usize,
    },

    /// Open the project page
    About,

    /// Calendar selection
    Calendars {
        #[command(subcommand)]
        action: CalendarsAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Calendar selection actions.
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum CalendarsAction {
    /// List calendars and whether they are selected
    List,

    /// Select or deselect a calendar
    Toggle {
        /// Calendar id
        id: String,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("nextup").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_subcommand() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn global_flags() {
        let cli = parse(&["--events", "/tmp/e.json", "-v", "--no-meeting-text", "Free", "status"]);
        assert_eq!(cli.events, Some(PathBuf::from("/tmp/e.json")));
        assert!(cli.debug);
        assert_eq!(cli.no_meeting_text.as_deref(), Some("Free"));
        assert_eq!(cli.command, Some(Command::Status));
    }

    #[test]
    fn subcommands() {
        assert_eq!(parse(&["menu", "--json"]).command, Some(Command::Menu { json: true }));
        assert_eq!(parse(&["open", "2"]).command, Some(Command::Open { position: 2 }));
        assert_eq!(
            parse(&["calendars", "toggle", "work"]).command,
            Some(Command::Calendars {
                action: CalendarsAction::Toggle {
                    id: "work".to_string()
                }
            })
        );
        assert_eq!(
            parse(&["config", "path"]).command,
            Some(Command::Config {
                action: ConfigAction::Path
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Cli::try_parse_from(["nextup", "open", "first"]).is_err());
        assert!(Cli::try_parse_from(["nextup", "calendars", "toggle"]).is_err());
    }
}
