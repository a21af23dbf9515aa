use acprio_traits::BusItem;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("item {0} is read-only")]
    ReadOnly(BusItem),
    #[error("bus unavailable: {0}")]
    Unavailable(String),
    #[error("trace exhausted after {0} samples")]
    TraceExhausted(usize),
}
