#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! `acprio`: drives the discharge controller against the simulated bus or a
//! recorded trace, and turns fatal errors into stable exit codes.

mod cli;
mod error_fmt;
mod logging;
mod run;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use acprio_core::error::ControllerError;
use clap::Parser;
use eyre::Result;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn load_config(path: &std::path::Path) -> Result<acprio_config::Config> {
    let cfg = acprio_config::load_file(path)
        .map_err(|e| eyre::Report::new(ControllerError::Config(format!("{e:#}"))))?;
    cfg.validate()
        .map_err(|e| eyre::Report::new(ControllerError::Config(format!("{e:#}"))))?;
    Ok(cfg)
}

fn install_shutdown_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let f = Arc::clone(&flag);
    if let Err(e) = ctrlc::set_handler(move || f.store(true, Ordering::Relaxed)) {
        tracing::warn!(error = %e, "could not install signal handler");
    }
    flag
}

fn real_main(cli: Cli) -> Result<()> {
    // Logging needs the [logging] section; a broken config still gets console logs.
    let loaded = load_config(&cli.config);
    let default_logging = acprio_config::Logging::default();
    let logging = loaded
        .as_ref()
        .map(|c| &c.logging)
        .unwrap_or(&default_logging);
    logging::init_tracing(cli.json, &cli.log_level, logging);
    let cfg = loaded?;
    tracing::info!(config = %cli.config.display(), "configuration loaded");

    let shutdown = install_shutdown_flag();
    let summary = match cli.cmd {
        Commands::Run { tick_ms, max_ticks } => {
            run::run_simulated(&cfg, tick_ms, max_ticks, shutdown)?
        }
        Commands::Replay {
            trace,
            minimum_soc,
            realtime,
            tick_ms,
        } => run::run_replay(&cfg, &trace, minimum_soc, realtime, tick_ms, shutdown)?,
        Commands::SelfCheck => {
            run::self_check(&cfg)?;
            println!("OK");
            return Ok(());
        }
    };
    println!("{}", run::render_summary(&summary, cli.json));
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        tracing::error!(error = ?e, "fatal");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}
