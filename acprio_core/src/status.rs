//! Outcome of one controller tick.

/// Public status of a single successful tick. Failures are returned as errors
/// and are always fatal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickStatus {
    /// The computed setpoint already matched the bus setting; nothing written.
    Unchanged,
    /// The setting was written with this value (W).
    Written(f64),
}
