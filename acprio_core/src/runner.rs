use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use acprio_traits::DataBus;
use acprio_traits::clock::Clock;

use crate::controller::DischargeController;
use crate::error::{ControllerError, Report, Result as CoreResult};
use crate::util::next_deadline;

/// Loop parameters.
#[derive(Debug, Clone)]
pub struct RunParams {
    /// Interval between ticks.
    pub tick: Duration,
    /// Stop cleanly after this many ticks (`None` runs until shutdown).
    pub max_ticks: Option<u64>,
}

/// Why a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown flag was raised.
    Shutdown,
    /// `max_ticks` was reached.
    MaxTicks,
    /// The bus ran out of samples.
    EndOfData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Ticks completed since the controller started.
    pub ticks: u64,
    /// Setpoint writes issued since the controller started.
    pub writes: u64,
    /// Ticks that finished after the next deadline had already passed.
    pub overruns: u64,
    pub final_setpoint_w: f64,
    pub ac_load_priority: bool,
    pub stop: StopReason,
}

fn is_end_of_data(e: &Report) -> bool {
    matches!(
        e.downcast_ref::<ControllerError>(),
        Some(ControllerError::EndOfData(_))
    )
}

/// Tick `controller` on a fixed cadence until shutdown, `max_ticks`, or end of data.
///
/// Ticks run sequentially on the calling thread, so a tick never starts before
/// the previous one returned. The shutdown flag is checked before every tick;
/// once it is raised no further sample is taken and nothing more is written.
/// Any tick error is returned as-is and ends the run.
pub fn run<B, C>(
    controller: &mut DischargeController<B>,
    params: &RunParams,
    clock: &C,
    shutdown: &AtomicBool,
) -> CoreResult<RunSummary>
where
    B: DataBus,
    C: Clock,
{
    let first_tick = controller.ticks();
    let mut overruns: u64 = 0;
    let mut deadline = clock.now() + params.tick;

    tracing::info!(
        tick_ms = params.tick.as_millis() as u64,
        max_ticks = ?params.max_ticks,
        "controller loop start"
    );

    let stop = loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }
        if params
            .max_ticks
            .is_some_and(|m| controller.ticks() - first_tick >= m)
        {
            break StopReason::MaxTicks;
        }

        clock.sleep_until(deadline);
        // Re-check after sleeping: a signal during the wait must not lead to one more write.
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }

        match controller.tick() {
            Ok(_) => {}
            Err(e) if is_end_of_data(&e) => break StopReason::EndOfData,
            Err(e) => {
                tracing::error!(error = ?e, tick = controller.ticks() + 1, "tick failed");
                return Err(e);
            }
        }

        let (next, overran) = next_deadline(deadline, clock.now(), params.tick);
        if overran {
            overruns += 1;
            tracing::warn!(tick = controller.ticks(), "tick overran its period");
        }
        deadline = next;
    };

    let state = controller.state();
    let (ticks, writes) = (controller.ticks(), controller.writes());
    tracing::info!(?stop, ticks, writes, "controller loop stopped");
    Ok(RunSummary {
        ticks,
        writes,
        overruns,
        final_setpoint_w: state.setpoint_w,
        ac_load_priority: state.ac_load_priority,
        stop,
    })
}
