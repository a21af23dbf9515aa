use acprio_traits::BusItem;
use thiserror::Error;

/// Everything that can end a controller run. None of these are retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControllerError {
    #[error("sample read failed for {what}: {reason}")]
    SampleRead { what: String, reason: String },
    #[error("write of {item} failed: {reason}")]
    Write { item: BusItem, reason: String },
    #[error("calculation fault: {0}")]
    Calculation(String),
    #[error("configuration error: {0}")]
    Config(String),
    /// The bus has no further samples (a replayed trace ran out).
    #[error("end of data after {0} samples")]
    EndOfData(usize),
}

impl ControllerError {
    pub fn sample_read(what: impl ToString, reason: impl ToString) -> Self {
        Self::SampleRead {
            what: what.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
