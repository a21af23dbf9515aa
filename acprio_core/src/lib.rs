#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Discharge controller core (transport-agnostic).
//!
//! Limits how much power the battery may discharge into the AC loads so that
//! SOC does not fall below the configured minimum, and near that minimum lets
//! the loads run on PV power instead of battery power. All I/O goes through
//! `acprio_traits::DataBus`.
//!
//! ## Architecture
//!
//! - **Sampler**: one consistent read of setting, minimum SOC, PV and SOC (`sampler`)
//! - **Smoothing**: fixed-length PV moving average (`smoothing`)
//! - **Mode**: AC-load priority flag with hysteresis (`mode`)
//! - **Power**: tiered setpoint formulas per SOC band (`power`)
//! - **Controller**: owned state, pure decision, conditional write-back (`controller`)
//! - **Runner**: fixed-cadence, non-overlapping tick loop (`runner`)
//!
//! Every error is fatal. The library only returns it; terminating the process
//! is left to the binary.

pub mod bus_error;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod mocks;
pub mod mode;
pub mod power;
pub mod runner;
pub mod sampler;
pub mod smoothing;
pub mod status;
pub mod util;

pub use config::ControllerCfg;
pub use controller::{Controller, ControllerState, DischargeController, TickDecision};
pub use error::{BuildError, ControllerError};
pub use mode::SocBand;
pub use runner::{RunParams, RunSummary, StopReason};
pub use sampler::{Sample, read_sample};
pub use smoothing::SmoothingWindow;
pub use status::TickStatus;
