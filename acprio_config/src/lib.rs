#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and trace parsing for the AC-load prioritizer.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The PV/SOC trace CSV loader enforces headers so recorded sessions can be
//!   replayed through the controller.
use serde::Deserialize;

/// Trace CSV schema.
///
/// Expected headers:
/// pv_power_w,soc
///
/// Example:
/// pv_power_w,soc
/// 420.0,23.5
/// 415.5,23.5
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TraceRow {
    pub pv_power_w: f64,
    pub soc: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControllerCfg {
    /// Upper bound for every computed discharge setpoint (W).
    pub max_discharge_power_w: f64,
    /// Priority mode is entered at or below `minimum_soc + soc_distance`.
    pub soc_distance: f64,
    /// SOC at or above `minimum_soc + soc_distance_full` counts as full.
    pub soc_distance_full: f64,
    /// Number of PV samples averaged by the smoothing window.
    pub pv_window: usize,
    /// Tick cadence in milliseconds.
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

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Parameters of the in-process simulated bus.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationCfg {
    /// Battery SOC at start (%).
    pub initial_soc: f64,
    /// Value of the BatteryLife minimum SOC setting (%).
    pub minimum_soc_limit: f64,
    /// Initial value of the max discharge power setting (W).
    pub initial_setting_w: f64,
    /// Usable battery capacity (Wh).
    pub capacity_wh: f64,
    /// Constant household AC load (W).
    pub load_w: f64,
    /// Peak PV power of the simulated day (W).
    pub pv_peak_w: f64,
    /// Length of one simulated PV day, in ticks.
    pub pv_period_ticks: u64,
}

impl Default for SimulationCfg {
    fn default() -> Self {
        Self {
            initial_soc: 30.0,
            minimum_soc_limit: 10.0,
            initial_setting_w: 3000.0,
            capacity_wh: 10_000.0,
            load_w: 400.0,
            pv_peak_w: 2500.0,
            pv_period_ticks: 3600,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub simulation: SimulationCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. A missing file yields the defaults.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration in {:?}: {}", path, e))
}

pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Vec<TraceRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["pv_power_w", "soc"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "trace CSV must have headers 'pv_power_w,soc', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TraceRow>().enumerate() {
        match rec {
            Ok(row) => {
                if !row.pv_power_w.is_finite() || !row.soc.is_finite() {
                    eyre::bail!("invalid CSV row {}: non-finite value", idx + 2);
                }
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("trace CSV {:?} has no rows", path);
    }
    Ok(rows)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Controller
        let c = &self.controller;
        if !(c.max_discharge_power_w.is_finite() && c.max_discharge_power_w > 0.0) {
            eyre::bail!("controller.max_discharge_power_w must be > 0");
        }
        if !(c.soc_distance.is_finite() && c.soc_distance >= 0.0) {
            eyre::bail!("controller.soc_distance must be >= 0");
        }
        if !(c.soc_distance_full.is_finite() && c.soc_distance_full > 0.0) {
            eyre::bail!("controller.soc_distance_full must be > 0");
        }
        if c.soc_distance > c.soc_distance_full {
            eyre::bail!("controller.soc_distance must not exceed controller.soc_distance_full");
        }
        if c.pv_window == 0 {
            eyre::bail!("controller.pv_window must be >= 1");
        }
        if c.tick_ms == 0 {
            eyre::bail!("controller.tick_ms must be >= 1");
        }
        if c.tick_ms > 60 * 60 * 1000 {
            eyre::bail!("controller.tick_ms is unreasonably large (>1h)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        // Simulation
        let s = &self.simulation;
        if !(0.0..=100.0).contains(&s.initial_soc) {
            eyre::bail!("simulation.initial_soc must be in [0, 100]");
        }
        if !(0.0..=100.0).contains(&s.minimum_soc_limit) {
            eyre::bail!("simulation.minimum_soc_limit must be in [0, 100]");
        }
        if !(s.initial_setting_w.is_finite() && s.initial_setting_w >= 0.0) {
            eyre::bail!("simulation.initial_setting_w must be >= 0");
        }
        if !(s.capacity_wh.is_finite() && s.capacity_wh > 0.0) {
            eyre::bail!("simulation.capacity_wh must be > 0");
        }
        if !(s.load_w.is_finite() && s.load_w >= 0.0) {
            eyre::bail!("simulation.load_w must be >= 0");
        }
        if !(s.pv_peak_w.is_finite() && s.pv_peak_w >= 0.0) {
            eyre::bail!("simulation.pv_peak_w must be >= 0");
        }
        if s.pv_period_ticks == 0 {
            eyre::bail!("simulation.pv_period_ticks must be >= 1");
        }

        Ok(())
    }
}
