//! Discharge setpoint formulas, one per SOC band.
//!
//! Full band: follow PV with a SOC-dependent multiplier, never decreasing.
//! Mid band: track smoothed PV so AC loads consume PV rather than the battery;
//! outside priority mode discharge is floored at half the cap.
//! Below minimum: discharge is disabled.

use crate::config::ControllerCfg;
use crate::mode::SocBand;

/// Above this SOC the full band allows twice the PV power.
pub const HIGH_SOC: f64 = 90.0;
/// Extra margin over the full-band threshold that unlocks the 1.5x multiplier.
pub const FULL_BAND_BOOST_MARGIN: f64 = 3.0;

/// Round to the nearest multiple of 10 W, ties to even (`315 -> 320`, `325 -> 320`).
#[inline]
pub fn round10(x: f64) -> f64 {
    (x / 10.0).round_ties_even() * 10.0
}

/// Target for the full band before the monotonic rule is applied.
pub fn full_band_tier(soc: f64, minimum_soc: f64, pv_avg_w: f64, cfg: &ControllerCfg) -> f64 {
    let multiplier = if soc > HIGH_SOC {
        2.0
    } else if soc >= minimum_soc + cfg.soc_distance_full + FULL_BAND_BOOST_MARGIN {
        1.5
    } else {
        1.0
    };
    cfg.max_discharge_power_w.min(pv_avg_w * multiplier)
}

/// PV-derived candidate for the mid band.
///
/// Slightly below the smoothed PV power so the battery is not drained. Once
/// discharging, the lower tier stays active down to 90 W to avoid toggling
/// around 100 W.
pub fn mid_band_candidate(pv_avg_w: f64, previous_w: f64) -> f64 {
    if pv_avg_w > 300.0 {
        round10(0.8 * pv_avg_w - 5.0)
    } else if pv_avg_w > 100.0 || (previous_w > 0.0 && pv_avg_w > 90.0) {
        round10(0.7 * pv_avg_w - 5.0) - 10.0
    } else {
        0.0
    }
}

/// Inputs to one setpoint computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerInputs {
    pub soc: f64,
    pub minimum_soc: f64,
    pub pv_avg_w: f64,
    pub ac_load_priority: bool,
    pub previous_w: f64,
}

/// New setpoint for `band`, clamped into `[0, max_discharge_power_w]`.
pub fn next_setpoint(band: SocBand, inputs: &PowerInputs, cfg: &ControllerCfg) -> f64 {
    let raw = match band {
        SocBand::Full => {
            let tier = full_band_tier(inputs.soc, inputs.minimum_soc, inputs.pv_avg_w, cfg);
            // Discharge power may only rise while the battery stays full.
            inputs.previous_w.max(tier)
        }
        SocBand::Mid => {
            let candidate = mid_band_candidate(inputs.pv_avg_w, inputs.previous_w);
            if inputs.ac_load_priority {
                candidate
            } else {
                (cfg.max_discharge_power_w / 2.0).trunc().max(candidate)
            }
        }
        SocBand::BelowMinimum => 0.0,
    };
    clamp_setpoint(raw, cfg.max_discharge_power_w)
}

#[inline]
pub fn clamp_setpoint(w: f64, max_w: f64) -> f64 {
    w.max(0.0).min(max_w)
}
