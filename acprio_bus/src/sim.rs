//! Simulated Venus-OS style bus.
//!
//! The settings store holds the max discharge power and minimum SOC settings.
//! Measurements come from a small energy model: DC-coupled PV charges the
//! battery, the inverter feeds the AC load from the battery up to the current
//! discharge setting, and SOC integrates the difference once per tick.

use std::f64::consts::PI;
use std::time::Duration;

use acprio_config::SimulationCfg;
use acprio_traits::{BusItem, DataBus};

use crate::error::BusError;

const SECS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Clone)]
pub struct SimulatedBus {
    setting_w: f64,
    minimum_soc: f64,
    soc: f64,
    pv_w: f64,
    capacity_wh: f64,
    load_w: f64,
    pv_peak_w: f64,
    pv_period_ticks: u64,
    dt_hours: f64,
    ticks: u64,
    started: bool,
    writes: u64,
    fail_after_ticks: Option<u64>,
}

impl SimulatedBus {
    pub fn new(cfg: &SimulationCfg, tick: Duration) -> Self {
        Self {
            setting_w: cfg.initial_setting_w,
            minimum_soc: cfg.minimum_soc_limit,
            soc: cfg.initial_soc,
            pv_w: 0.0,
            capacity_wh: cfg.capacity_wh,
            load_w: cfg.load_w,
            pv_peak_w: cfg.pv_peak_w,
            pv_period_ticks: cfg.pv_period_ticks.max(1),
            dt_hours: tick.as_secs_f64() / SECS_PER_HOUR,
            ticks: 0,
            started: false,
            writes: 0,
            fail_after_ticks: None,
        }
    }

    /// Make `refresh` fail once `n` ticks have been simulated.
    pub fn fail_after_ticks(mut self, n: u64) -> Self {
        self.fail_after_ticks = Some(n);
        self
    }

    pub fn soc(&self) -> f64 {
        self.soc
    }

    pub fn setting_w(&self) -> f64 {
        self.setting_w
    }

    /// Number of writes accepted so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// PV output of the simulated day: positive half of a sine wave.
    fn pv_at(&self, tick: u64) -> f64 {
        let phase = (tick % self.pv_period_ticks) as f64 / self.pv_period_ticks as f64;
        (self.pv_peak_w * (2.0 * PI * phase).sin()).max(0.0)
    }

    fn advance(&mut self) {
        let inverter_w = self.setting_w.max(0.0).min(self.load_w);
        let net_w = self.pv_w - inverter_w;
        let delta_pct = net_w * self.dt_hours / self.capacity_wh * 100.0;
        self.soc = (self.soc + delta_pct).clamp(0.0, 100.0);
        self.ticks += 1;
        self.pv_w = self.pv_at(self.ticks);
    }
}

impl DataBus for SimulatedBus {
    fn refresh(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(limit) = self.fail_after_ticks
            && self.ticks >= limit
        {
            return Err(Box::new(BusError::Unavailable(format!(
                "simulated failure after {limit} ticks"
            ))));
        }
        // The first refresh only latches the initial state.
        if self.started {
            self.advance();
        } else {
            self.started = true;
            self.pv_w = self.pv_at(0);
        }
        tracing::trace!(tick = self.ticks, soc = self.soc, pv_w = self.pv_w, "sim refresh");
        Ok(())
    }

    fn read(&mut self, item: BusItem) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match item {
            BusItem::MaxDischargePower => self.setting_w,
            BusItem::MinimumSocLimit => self.minimum_soc,
            BusItem::PvPower => self.pv_w,
            BusItem::BatterySoc => self.soc,
        })
    }

    fn write(
        &mut self,
        item: BusItem,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !item.is_writable() {
            return Err(Box::new(BusError::ReadOnly(item)));
        }
        self.setting_w = value;
        self.writes += 1;
        Ok(())
    }
}
