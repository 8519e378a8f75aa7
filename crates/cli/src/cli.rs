//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Rig Sync - triggered stereo camera shutter sync against a simulated rig
#[derive(Parser, Debug)]
#[command(
    name = "rig-sync",
    author,
    version,
    about = "Triggered stereo camera shutter sync",
    long_about = "Loads a rig of triggered cameras, classifies them into reference and \n\
                  secondary roles, publishes one frame per trigger with matching stamps, \n\
                  and re-arms the cameras at a fixed trigger rate."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RIG_SYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RIG_SYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the rig and run the trigger cadence
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display rig, camera roles, baselines and topics
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "config.toml", env = "RIG_SYNC_CONFIG")]
    pub config: PathBuf,

    /// Stop after this many seconds (0 = run until Ctrl+C)
    #[arg(long, default_value = "0", env = "RIG_SYNC_DURATION_SECS")]
    pub duration_secs: u64,

    /// Stop after this many stereo pairs (0 = unlimited)
    #[arg(long, default_value = "0", env = "RIG_SYNC_MAX_PAIRS")]
    pub max_pairs: u64,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "RIG_SYNC_METRICS_PORT")]
    pub metrics_port: u16,

    /// Maximum stamp difference for a stereo pair, in milliseconds
    #[arg(long, default_value = "1.0")]
    pub pair_tolerance_ms: f64,

    /// Pretend the messaging runtime is not up (exercises the load failure)
    #[arg(long)]
    pub runtime_uninitialized: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
