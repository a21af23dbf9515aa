//! Maps `Box<dyn Error>` from the `DataBus` boundary to typed `ControllerError`.
//!
//! `acprio_traits::DataBus` uses `Box<dyn Error + Send + Sync>` so any transport
//! can plug in; this module converts those to our typed error enum, with an
//! optional feature-gated path for `acprio_bus::BusError` downcasting.

use acprio_traits::BusItem;

use crate::error::ControllerError;

/// Which bus call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Refresh,
    Read(BusItem),
    Write(BusItem),
}

impl BusOp {
    fn describe(self) -> String {
        match self {
            BusOp::Refresh => "bus snapshot".to_string(),
            BusOp::Read(item) | BusOp::Write(item) => item.to_string(),
        }
    }
}

/// Map a trait-boundary error to a typed `ControllerError`.
///
/// Only a typed `acprio_bus::BusError::TraceExhausted` ends a run cleanly;
/// every other error, whatever its message, is a read or write failure.
pub fn map_bus_error(op: BusOp, e: &(dyn std::error::Error + 'static)) -> ControllerError {
    #[cfg(feature = "bus-errors")]
    {
        if let Some(acprio_bus::BusError::TraceExhausted(n)) =
            e.downcast_ref::<acprio_bus::BusError>()
        {
            return ControllerError::EndOfData(*n);
        }
    }
    classify(op, e.to_string())
}

fn classify(op: BusOp, reason: String) -> ControllerError {
    match op {
        BusOp::Write(item) => ControllerError::Write { item, reason },
        BusOp::Refresh | BusOp::Read(_) => ControllerError::SampleRead {
            what: op.describe(),
            reason,
        },
    }
}
