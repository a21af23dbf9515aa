//! Bus assembly and controller runs for each subcommand.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use acprio_bus::{ReplayBus, SimulatedBus};
use acprio_config::Config;
use acprio_core::error::{ControllerError, Result as CoreResult};
use acprio_core::runner::{RunParams, RunSummary, StopReason, run};
use acprio_core::util::tick_period;
use acprio_core::{DischargeController, read_sample};
use acprio_traits::clock::{ManualClock, MonotonicClock};
use eyre::WrapErr;

/// Test hook: make the simulated bus fail after this many ticks.
const SIM_FAIL_AFTER_ENV: &str = "ACPRIO_TEST_SIM_FAIL_AFTER";

pub fn stop_reason_name(r: StopReason) -> &'static str {
    match r {
        StopReason::Shutdown => "Shutdown",
        StopReason::MaxTicks => "MaxTicks",
        StopReason::EndOfData => "EndOfData",
    }
}

fn controller_cfg(cfg: &Config, tick_ms: Option<u64>) -> acprio_core::ControllerCfg {
    let mut c: acprio_core::ControllerCfg = (&cfg.controller).into();
    if let Some(ms) = tick_ms {
        c.tick_ms = ms;
    }
    c
}

fn simulated_bus(cfg: &Config, tick: Duration) -> SimulatedBus {
    let bus = SimulatedBus::new(&cfg.simulation, tick);
    match std::env::var(SIM_FAIL_AFTER_ENV)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
    {
        Some(n) => {
            tracing::warn!(ticks = n, "simulated bus failure injection enabled");
            bus.fail_after_ticks(n)
        }
        None => bus,
    }
}

/// Run against the simulated bus on the wall clock.
pub fn run_simulated(
    cfg: &Config,
    tick_ms: Option<u64>,
    max_ticks: Option<u64>,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<RunSummary> {
    let ccfg = controller_cfg(cfg, tick_ms);
    let tick = tick_period(ccfg.tick_ms);
    let bus = simulated_bus(cfg, tick);

    let mut controller = DischargeController::start(bus, ccfg)?;
    let params = RunParams { tick, max_ticks };
    run(&mut controller, &params, &MonotonicClock::new(), &shutdown)
}

/// Replay a recorded trace. Back-to-back on a manual clock unless `realtime`.
pub fn run_replay(
    cfg: &Config,
    trace: &std::path::Path,
    minimum_soc: Option<f64>,
    realtime: bool,
    tick_ms: Option<u64>,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<RunSummary> {
    let rows = acprio_config::load_trace_csv(trace)?;
    tracing::info!(rows = rows.len(), trace = %trace.display(), "trace loaded");

    let minimum_soc = minimum_soc.unwrap_or(cfg.simulation.minimum_soc_limit);
    if !(0.0..=100.0).contains(&minimum_soc) {
        return Err(eyre::Report::new(ControllerError::Config(format!(
            "minimum soc {minimum_soc} outside [0, 100]"
        ))));
    }
    let bus = ReplayBus::new(rows, minimum_soc, cfg.simulation.initial_setting_w);

    let ccfg = controller_cfg(cfg, tick_ms);
    let params = RunParams {
        tick: tick_period(ccfg.tick_ms),
        max_ticks: None,
    };
    let mut controller = DischargeController::start(bus, ccfg)?;
    if realtime {
        run(&mut controller, &params, &MonotonicClock::new(), &shutdown)
    } else {
        run(&mut controller, &params, &ManualClock::new(), &shutdown)
    }
}

/// Take one sample from the simulated bus and build a controller from it.
pub fn self_check(cfg: &Config) -> CoreResult<()> {
    let ccfg = controller_cfg(cfg, None);
    let mut bus = simulated_bus(cfg, tick_period(ccfg.tick_ms));
    let sample = read_sample(&mut bus).wrap_err("self-check sample")?;
    let controller = acprio_core::Controller::new(&sample, ccfg)?;
    tracing::info!(
        soc = sample.soc,
        pv_power_w = sample.pv_power_w,
        ac_load_priority = controller.state().ac_load_priority,
        "self-check sample ok"
    );
    Ok(())
}

/// One line for humans, one JSON object with `--json`.
pub fn render_summary(s: &RunSummary, json: bool) -> String {
    if json {
        serde_json::json!({
            "status": "stopped",
            "reason": stop_reason_name(s.stop),
            "ticks": s.ticks,
            "writes": s.writes,
            "overruns": s.overruns,
            "final_setpoint_w": s.final_setpoint_w,
            "ac_load_priority": s.ac_load_priority,
        })
        .to_string()
    } else {
        format!(
            "stopped ({}) after {} ticks: {} writes, {} overruns, setpoint {:.0} W, ac-load priority {}",
            stop_reason_name(s.stop),
            s.ticks,
            s.writes,
            s.overruns,
            s.final_setpoint_w,
            if s.ac_load_priority { "on" } else { "off" },
        )
    }
}
