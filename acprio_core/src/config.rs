//! Runtime configuration for the discharge controller.
//!
//! Separate from the TOML-deserialized config in `acprio_config`; see
//! `conversions` for the mapping.

/// Controller tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerCfg {
    /// Cap for every computed setpoint (W).
    pub max_discharge_power_w: f64,
    /// Priority mode is entered at or below `minimum_soc + soc_distance`.
    pub soc_distance: f64,
    /// SOC at or above `minimum_soc + soc_distance_full` is the full band.
    pub soc_distance_full: f64,
    /// PV smoothing window length (samples).
    pub pv_window: usize,
    /// Tick cadence (ms).
    pub tick_ms: u64,
}

impl Default for ControllerCfg {
    fn default() -> Self {
        Self {
            max_discharge_power_w: 3000.0,
            soc_distance: 5.0,
            soc_distance_full: 10.0,
            pv_window: 15,
            tick_ms: 1000,
        }
    }
}

impl ControllerCfg {
    pub fn validate(&self) -> Result<(), crate::error::BuildError> {
        use crate::error::BuildError::InvalidConfig;
        if !(self.max_discharge_power_w.is_finite() && self.max_discharge_power_w > 0.0) {
            return Err(InvalidConfig("max_discharge_power_w must be > 0"));
        }
        if !(self.soc_distance.is_finite() && self.soc_distance_full.is_finite()) {
            return Err(InvalidConfig("soc distances must be finite"));
        }
        if self.soc_distance < 0.0 || self.soc_distance > self.soc_distance_full {
            return Err(InvalidConfig(
                "soc_distance must be in [0, soc_distance_full]",
            ));
        }
        if self.pv_window == 0 {
            return Err(InvalidConfig("pv_window must be >= 1"));
        }
        if self.tick_ms == 0 {
            return Err(InvalidConfig("tick_ms must be >= 1"));
        }
        Ok(())
    }
}
