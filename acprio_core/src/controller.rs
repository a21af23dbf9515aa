//! The discharge controller.
//!
//! [`Controller`] owns the smoothing window and the priority/setpoint state and
//! turns one [`Sample`] into one [`TickDecision`] without touching any I/O.
//! [`DischargeController`] binds it to a [`DataBus`]: sample, decide, and write
//! the setpoint back when it differs from what the bus currently holds.

use acprio_traits::{BusItem, DataBus};
use eyre::WrapErr;

use crate::bus_error::{BusOp, map_bus_error};
use crate::config::ControllerCfg;
use crate::error::{ControllerError, Result};
use crate::mode::{SocBand, next_priority};
use crate::power::{PowerInputs, next_setpoint};
use crate::sampler::{Sample, read_sample};
use crate::smoothing::SmoothingWindow;
use crate::status::TickStatus;

/// Mutable controller state carried from tick to tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerState {
    pub ac_load_priority: bool,
    /// Last computed discharge setpoint (W), within `[0, max_discharge_power_w]`.
    pub setpoint_w: f64,
}

impl ControllerState {
    /// State derived from the first sample: a battery below the full band
    /// starts in priority mode with discharge disabled.
    pub fn initial(sample: &Sample, cfg: &ControllerCfg) -> Self {
        if sample.soc >= sample.minimum_soc + cfg.soc_distance_full {
            Self {
                ac_load_priority: false,
                setpoint_w: cfg.max_discharge_power_w,
            }
        } else {
            Self {
                ac_load_priority: true,
                setpoint_w: 0.0,
            }
        }
    }
}

/// Everything one tick decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickDecision {
    pub band: SocBand,
    pub pv_avg_w: f64,
    pub previous: ControllerState,
    pub state: ControllerState,
    /// Value to write to the discharge setting, if it differs from the bus.
    pub write: Option<f64>,
}

impl TickDecision {
    pub fn priority_changed(&self) -> bool {
        self.previous.ac_load_priority != self.state.ac_load_priority
    }
}

#[derive(Debug, Clone)]
pub struct Controller {
    cfg: ControllerCfg,
    window: SmoothingWindow,
    state: ControllerState,
}

impl Controller {
    /// Build a controller from its first sample. The PV window is seeded with
    /// that sample's PV power.
    pub fn new(first: &Sample, cfg: ControllerCfg) -> Result<Self> {
        cfg.validate()
            .map_err(|e| eyre::Report::new(ControllerError::Config(e.to_string())))?;
        Ok(Self {
            window: SmoothingWindow::seeded(first.pv_power_w, cfg.pv_window),
            state: ControllerState::initial(first, &cfg),
            cfg,
        })
    }

    /// Advance one tick: smooth PV, update the priority flag, compute the
    /// setpoint, and decide whether it must be written.
    #[allow(clippy::float_cmp)]
    pub fn decide(&mut self, sample: &Sample) -> Result<TickDecision> {
        let pv_avg_w = self.window.push(sample.pv_power_w);
        let band = SocBand::classify(sample.soc, sample.minimum_soc, &self.cfg);
        let previous = self.state;

        let ac_load_priority = next_priority(
            band,
            previous.ac_load_priority,
            sample.soc,
            sample.minimum_soc,
            &self.cfg,
        );
        let setpoint_w = next_setpoint(
            band,
            &PowerInputs {
                soc: sample.soc,
                minimum_soc: sample.minimum_soc,
                pv_avg_w,
                ac_load_priority,
                previous_w: previous.setpoint_w,
            },
            &self.cfg,
        );
        if !setpoint_w.is_finite() {
            return Err(eyre::Report::new(ControllerError::Calculation(format!(
                "non-finite setpoint from pv_avg_w={pv_avg_w} soc={}",
                sample.soc
            ))));
        }

        self.state = ControllerState {
            ac_load_priority,
            setpoint_w,
        };
        // Compare against the bus value, not our own previous setpoint, so an
        // external override is corrected on the next tick.
        let write = (setpoint_w != sample.setting_w).then_some(setpoint_w);

        Ok(TickDecision {
            band,
            pv_avg_w,
            previous,
            state: self.state,
            write,
        })
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn window(&self) -> &SmoothingWindow {
        &self.window
    }

    pub fn cfg(&self) -> &ControllerCfg {
        &self.cfg
    }
}

/// A [`Controller`] wired to its bus.
pub struct DischargeController<B: DataBus> {
    bus: B,
    core: Controller,
    ticks: u64,
    writes: u64,
}

impl<B: DataBus> core::fmt::Debug for DischargeController<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DischargeController")
            .field("state", &self.core.state)
            .field("ticks", &self.ticks)
            .field("writes", &self.writes)
            .finish()
    }
}

impl<B: DataBus> DischargeController<B> {
    /// Take the first sample and initialize the controller from it.
    pub fn start(mut bus: B, cfg: ControllerCfg) -> Result<Self> {
        let first = read_sample(&mut bus).wrap_err("initial sample")?;
        let core = Controller::new(&first, cfg)?;

        tracing::info!(
            setting_w = first.setting_w,
            minimum_soc = first.minimum_soc,
            soc = first.soc,
            pv_power_w = first.pv_power_w,
            "initial values"
        );
        let state = core.state();
        tracing::info!(
            battery = if state.ac_load_priority { "empty" } else { "full" },
            ac_load_priority = state.ac_load_priority,
            setpoint_w = state.setpoint_w,
            "initial battery state"
        );

        Ok(Self {
            bus,
            core,
            ticks: 0,
            writes: 0,
        })
    }

    /// One full cycle: sample, decide, conditionally write.
    pub fn tick(&mut self) -> Result<TickStatus> {
        let sample = read_sample(&mut self.bus)?;
        let d = self.core.decide(&sample)?;
        self.ticks += 1;

        tracing::debug!(
            pv_avg_w = d.pv_avg_w,
            band = d.band.as_str(),
            setpoint_w = d.state.setpoint_w,
            "tick"
        );
        if d.priority_changed() {
            tracing::info!(
                from = d.previous.ac_load_priority,
                to = d.state.ac_load_priority,
                soc = sample.soc,
                "acload priority changed"
            );
        }
        if d.band == SocBand::BelowMinimum && d.previous.setpoint_w > 0.0 {
            tracing::info!(soc = sample.soc, "disable discharge: below minimum soc");
        }

        let Some(w) = d.write else {
            return Ok(TickStatus::Unchanged);
        };
        tracing::debug!(from_w = sample.setting_w, to_w = w, "set discharge limit");
        self.bus
            .write(BusItem::MaxDischargePower, w)
            .map_err(|e| {
                eyre::Report::new(map_bus_error(BusOp::Write(BusItem::MaxDischargePower), &*e))
            })
            .wrap_err("writing discharge setpoint")?;
        self.writes += 1;
        Ok(TickStatus::Written(w))
    }

    pub fn state(&self) -> ControllerState {
        self.core.state()
    }

    pub fn controller(&self) -> &Controller {
        &self.core
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Ticks completed since start.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Setpoint writes issued since start.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}
