//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use roomwatch_types::{Quantity, RoomId};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "roomwatch")]
#[command(author, version, about = "Environmental monitor for lecture rooms", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true, env = "ROOMWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Room selection shared by several commands
#[derive(Debug, Clone, Args)]
pub struct RoomArgs {
    /// Room id (defaults to the configured default room)
    #[arg(short, long)]
    pub room: Option<RoomId>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Tick continuously and print the dashboard after every tick
    Run {
        #[command(flatten)]
        room: RoomArgs,

        /// Seconds between ticks (overrides config)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=3600))]
        interval: Option<u64>,

        /// Stop after this many ticks
        #[arg(short = 'n', long)]
        ticks: Option<u64>,

        /// Output format (text, json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Tick once and print the dashboard
    Status {
        #[command(flatten)]
        room: RoomArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the seeded history of one quantity
    History {
        #[command(flatten)]
        room: RoomArgs,

        /// Quantity (temperature, humidity, co2, voc, lux)
        #[arg(short = 'Q', long)]
        quantity: Quantity,

        /// Only the most recent N points (0 for all)
        #[arg(short, long, default_value = "0")]
        limit: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List monitored rooms
    Rooms {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Check the configuration for errors
    Validate,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
