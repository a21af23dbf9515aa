//! In-tree transports for the discharge controller.
//!
//! - [`SimulatedBus`]: settings store plus a toy battery/PV model, for running
//!   the controller without a live system.
//! - [`ReplayBus`]: feeds a recorded PV/SOC trace, one row per tick.
pub mod error;
pub mod replay;
pub mod sim;

pub use error::BusError;
pub use replay::ReplayBus;
pub use sim::SimulatedBus;
