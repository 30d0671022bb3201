//! roomwatch: environmental monitor for lecture rooms.
//!
//! # Usage
//!
//! ```bash
//! # Live dashboard, ticking every 10 seconds
//! roomwatch run
//!
//! # One reading for a specific room, as JSON
//! roomwatch status --room sala-102 --format json
//!
//! # Last day of CO₂ history as CSV
//! roomwatch history --quantity co2 --limit 24 --format csv
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use roomwatch_service::cli::{Cli, Commands, ConfigAction, OutputFormat, RoomArgs};
use roomwatch_service::config::{Config, ConfigError, default_config_path};
use roomwatch_service::format::{self, FormatOptions};
use roomwatch_service::interactive::{self, Command};
use roomwatch_service::{AppState, Collector};
use roomwatch_types::{Quantity, RoomId};

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        config,
        verbose,
        quiet,
        no_color,
        command,
    } = Cli::parse();

    // Logs go to stderr so stdout carries only the dashboard.
    let filter = if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let no_color = no_color || std::env::var_os("NO_COLOR").is_some();
    let opts = FormatOptions::new(no_color);
    let explicit = config.is_some();
    let config_path = config.unwrap_or_else(default_config_path);

    match command {
        Commands::Config { action } => cmd_config(action, &config_path, explicit),
        Commands::Run {
            room,
            interval,
            ticks,
            format,
        } => {
            let config = load_config(&config_path, explicit, &room)?;
            cmd_run(config, interval, ticks, format, opts).await
        }
        Commands::Status { room, format } => {
            let config = load_config(&config_path, explicit, &room)?;
            cmd_status(config, format, opts).await
        }
        Commands::History {
            room,
            quantity,
            limit,
            format,
        } => {
            let config = load_config(&config_path, explicit, &room)?;
            cmd_history(config, quantity, limit, format, opts).await
        }
        Commands::Rooms { format } => {
            let config = load_config(&config_path, explicit, &RoomArgs { room: None })?;
            cmd_rooms(&config, format, opts)
        }
    }
}

/// Read the config file, falling back to defaults when the default path
/// does not exist. An explicitly named file must exist.
fn read_config(path: &Path, explicit: bool) -> Result<Config, ConfigError> {
    if explicit {
        Config::load(path)
    } else {
        Config::load_or_default(path)
    }
}

/// Load, apply the `--room` override, and validate.
fn load_config(path: &Path, explicit: bool, room: &RoomArgs) -> Result<Config> {
    let mut config = read_config(path, explicit)?;
    if let Some(room) = &room.room {
        config.monitor.default_room = room.clone();
    }
    config.validate()?;
    Ok(config)
}

fn cmd_config(action: ConfigAction, path: &Path, explicit: bool) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = read_config(path, explicit)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Validate => {
            if !explicit && !path.exists() {
                Config::default().validate()?;
                println!("No config file at {}; defaults are valid", path.display());
            } else {
                Config::load_validated(path)?;
                println!("Configuration OK: {}", path.display());
            }
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "Config file already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save(path)?;
            println!("Wrote default configuration to {}", path.display());
        }
    }
    Ok(())
}

async fn cmd_status(config: Config, format: OutputFormat, opts: FormatOptions) -> Result<()> {
    let state = AppState::from_config(config)?;
    state.refresh().await?;
    print_snapshot(&state, format, &opts).await
}

async fn cmd_history(
    config: Config,
    quantity: Quantity,
    limit: usize,
    format: OutputFormat,
    opts: FormatOptions,
) -> Result<()> {
    let state = AppState::from_config(config)?;
    state.refresh().await?;
    let room = state.snapshot().await?.room;
    let mut series = state.history_series(&room.id, quantity).await?;
    if limit > 0 && series.len() > limit {
        series.drain(..series.len() - limit);
    }

    let output = match format {
        OutputFormat::Text => format::format_history_text(&room, quantity, &series, &opts),
        OutputFormat::Json => format::format_history_json(&room.id, quantity, &series, &opts)?,
        OutputFormat::Csv => format::format_history_csv(quantity, &series),
    };
    print!("{}", output);
    Ok(())
}

fn cmd_rooms(config: &Config, format: OutputFormat, opts: FormatOptions) -> Result<()> {
    let rooms: Vec<_> = config.catalog().iter().cloned().collect();
    let output = match format {
        OutputFormat::Text => {
            format::format_rooms_text(&rooms, Some(&config.monitor.default_room), &opts)
        }
        OutputFormat::Json => opts.as_json(&rooms)?,
        OutputFormat::Csv => format::format_rooms_csv(&rooms),
    };
    print!("{}", output);
    Ok(())
}

async fn cmd_run(
    config: Config,
    interval: Option<u64>,
    ticks: Option<u64>,
    format: OutputFormat,
    opts: FormatOptions,
) -> Result<()> {
    let state = AppState::from_config(config)?;
    let mut events = state.subscribe();

    let mut collector = Collector::new(Arc::clone(&state));
    if let Some(secs) = interval {
        collector = collector.with_period(Duration::from_secs(secs));
    }
    let handle = collector.start();

    // One JSON document per line while streaming.
    let dashboard_opts = opts.with_compact(true);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut seen = 0u64;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(_) => {
                    print_snapshot(&state, format, &dashboard_opts).await?;
                    seen += 1;
                    if ticks.is_some_and(|n| seen >= n) {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => warn!("Dashboard skipped {} tick(s)", n),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read stdin")? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => match line.parse::<Command>() {
                        Ok(Command::Quit) => break,
                        Ok(command) => handle_command(&state, command, &opts).await?,
                        Err(e) => eprintln!("{}", e),
                    },
                    None => {
                        stdin_open = false;
                        if ticks.is_none() {
                            break;
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    state.collector.signal_stop();
    handle.await?;
    Ok(())
}

/// Run one interactive command. Trigger errors are reported and the loop
/// continues; the dashboard is reprinted from the resulting tick event.
async fn handle_command(state: &AppState, command: Command, opts: &FormatOptions) -> Result<()> {
    match command {
        Command::Room(id) => report(state.select_room(&id).await.map(|_| ())),
        Command::Refresh => report(state.refresh().await.map(|_| ())),
        Command::Set(fields) => {
            let room = current_room(state).await?;
            match state.update_thresholds(&fields).await {
                Ok(_) => println!("Thresholds saved for {}", room),
                Err(e) => eprintln!("Error: {} (thresholds for {} unchanged)", e, room),
            }
        }
        Command::History(quantity) => {
            let room = state.snapshot().await?.room;
            let series = state.history_series(&room.id, quantity).await?;
            print!(
                "{}",
                format::format_history_text(&room, quantity, &series, opts)
            );
        }
        Command::Alerts => {
            let snapshot = state.snapshot().await?;
            print!("{}", format::format_alerts_text(&snapshot.alerts, opts));
        }
        Command::Rooms => {
            let snapshot = state.snapshot().await?;
            print!(
                "{}",
                format::format_rooms_text(&snapshot.rooms, Some(&snapshot.room.id), opts)
            );
        }
        Command::Help => print!("{}", interactive::HELP),
        Command::Quit => {}
    }
    Ok(())
}

fn report(result: roomwatch_core::Result<()>) {
    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }
}

async fn current_room(state: &AppState) -> Result<RoomId> {
    Ok(state.snapshot().await?.room.id)
}

async fn print_snapshot(state: &AppState, format: OutputFormat, opts: &FormatOptions) -> Result<()> {
    let snapshot = state.snapshot().await?;
    let output = match format {
        OutputFormat::Text => format::format_snapshot_text(&snapshot, opts),
        OutputFormat::Json => opts.as_json(&snapshot)?,
        OutputFormat::Csv => format::format_metrics_csv(&snapshot),
    };
    print!("{}", output);
    Ok(())
}
