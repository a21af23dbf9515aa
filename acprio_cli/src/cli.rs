//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "acprio", version, about = "AC-load prioritizer: battery discharge limit controller")]
pub struct Cli {
    /// Path to config TOML (missing file means defaults)
    #[arg(long, value_name = "FILE", default_value = "etc/acprio.toml")]
    pub config: PathBuf,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the controller against the simulated battery/PV bus
    Run {
        /// Tick period in ms (overrides controller.tick_ms)
        #[arg(long, value_name = "MS")]
        tick_ms: Option<u64>,
        /// Stop after this many ticks instead of running until interrupted
        #[arg(long, value_name = "N")]
        max_ticks: Option<u64>,
    },
    /// Replay a recorded PV/SOC trace through the controller
    Replay {
        /// Trace CSV with headers `pv_power_w,soc`
        #[arg(long, value_name = "FILE")]
        trace: PathBuf,
        /// Minimum SOC limit for the replay (defaults to simulation.minimum_soc_limit)
        #[arg(long, value_name = "PERCENT")]
        minimum_soc: Option<f64>,
        /// Pace ticks in real time instead of replaying back-to-back
        #[arg(long, action = ArgAction::SetTrue)]
        realtime: bool,
        /// Tick period in ms (overrides controller.tick_ms)
        #[arg(long, value_name = "MS")]
        tick_ms: Option<u64>,
    },
    /// Validate config and take one sample from the simulated bus
    SelfCheck,
}
