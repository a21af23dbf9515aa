//! `From` implementations bridging `acprio_config` types to `acprio_core` types.

use crate::config::ControllerCfg;

impl From<&acprio_config::ControllerCfg> for ControllerCfg {
    fn from(c: &acprio_config::ControllerCfg) -> Self {
        Self {
            max_discharge_power_w: c.max_discharge_power_w,
            soc_distance: c.soc_distance,
            soc_distance_full: c.soc_distance_full,
            pv_window: c.pv_window,
            tick_ms: c.tick_ms,
        }
    }
}
