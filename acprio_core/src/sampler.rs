//! One consistent read of the four bus values per tick.
//!
//! Every failure is final: there is no retry and no substitute value, because
//! a stale or made-up power reading could command an unsafe discharge rate.

use acprio_traits::{BusItem, DataBus};
use eyre::WrapErr;

use crate::bus_error::{BusOp, map_bus_error};
use crate::error::{ControllerError, Result};

/// Values captured at the start of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Current max discharge power setting as read from the bus (W).
    pub setting_w: f64,
    /// BatteryLife minimum SOC limit (%).
    pub minimum_soc: f64,
    /// Raw, unsmoothed PV power (W).
    pub pv_power_w: f64,
    /// Battery SOC (%).
    pub soc: f64,
}

/// Latch the bus snapshot and read all four values.
pub fn read_sample<B: DataBus + ?Sized>(bus: &mut B) -> Result<Sample> {
    bus.refresh()
        .map_err(|e| eyre::Report::new(map_bus_error(BusOp::Refresh, &*e)))
        .wrap_err("refreshing bus snapshot")?;

    let sample = Sample {
        setting_w: read_item(bus, BusItem::MaxDischargePower)?,
        minimum_soc: read_item(bus, BusItem::MinimumSocLimit)?,
        pv_power_w: read_item(bus, BusItem::PvPower)?,
        soc: read_item(bus, BusItem::BatterySoc)?,
    };
    tracing::debug!(
        setting_w = sample.setting_w,
        minimum_soc = sample.minimum_soc,
        soc = sample.soc,
        pv_power_w = sample.pv_power_w,
        "sample"
    );
    Ok(sample)
}

fn read_item<B: DataBus + ?Sized>(bus: &mut B, item: BusItem) -> Result<f64> {
    let v = bus
        .read(item)
        .map_err(|e| eyre::Report::new(map_bus_error(BusOp::Read(item), &*e)))
        .wrap_err_with(|| format!("reading {item}"))?;
    if !v.is_finite() {
        return Err(eyre::Report::new(ControllerError::sample_read(
            item,
            format!("non-finite value {v}"),
        )));
    }
    Ok(v)
}
