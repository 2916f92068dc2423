//! nextup CLI entry point.

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;

use nextup_client::cli::{CalendarsAction, Cli, Command, ConfigAction};
use nextup_client::commands::{self, Context};
use nextup_client::config::ClientConfig;
use nextup_client::error::ClientResult;
use nextup_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let mut config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)?
    } else {
        ClientConfig::load()?
    };

    // Command-line overrides
    if let Some(events) = cli.events {
        config.source.events_file = Some(events);
    }
    if let Some(preferences) = cli.preferences {
        config.source.preferences_file = Some(preferences);
    }
    if let Some(text) = cli.no_meeting_text {
        config.display.no_meeting_text = text;
    }
    let debug = cli.debug || config.debug;

    // Initialize tracing
    let tracing_config = match (&cli.command, debug) {
        (_, true) => TracingConfig::debug(),
        (Some(Command::Watch), false) => TracingConfig::watch(),
        _ => TracingConfig::default(),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    // Configuration commands work without an events file
    if let Some(Command::Config { action }) = &cli.command {
        return match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config, &config_path),
        };
    }

    let mut ctx = Context::from_config(config)?;
    let now = Utc::now();

    match cli.command {
        None | Some(Command::Status) => commands::status::status(&ctx, now),
        Some(Command::Menu { json }) => commands::status::menu(&ctx, now, json),
        Some(Command::Watch) => commands::watch::run(&mut ctx, debug).await,
        Some(Command::Join) => commands::open::join(&mut ctx, now),
        Some(Command::Open { position }) => commands::open::open(&mut ctx, now, position),
        Some(Command::About) => commands::open::about(&mut ctx),
        Some(Command::Calendars { action }) => match action {
            CalendarsAction::List => commands::calendars::list(&ctx),
            CalendarsAction::Toggle { id } => commands::calendars::toggle(&mut ctx, &id),
        },
        Some(Command::Config { .. }) => Ok(()),
    }
}
