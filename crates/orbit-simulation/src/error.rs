//! Engine error taxonomy
//!
//! Initialization and device loss are fatal; a read-back conflict is a
//! caller error; capacity exhaustion is recoverable and usually handled
//! by clamping before it surfaces. Numerical anomalies never appear here:
//! they are recovered internally by removing the offending object.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No usable compute backend. Fatal; there is no silent fallback.
    #[error("backend initialization failed: {0}")]
    Initialization(String),

    /// The compute device was lost mid-flight. Fatal; the engine must be
    /// rebuilt, steps are never retried transparently.
    #[error("compute device lost: {0}")]
    DeviceLost(String),

    /// `step` was called while a prior snapshot read-back was still in
    /// flight. Rejected rather than queued; resolve the snapshot first.
    #[error("a snapshot read-back is still in flight")]
    ReadbackInFlight,
}

/// The object store is full. Returned by `ObjectStore::allocate`; callers
/// that can clamp (population seeding, debris emission) do so and report
/// the shortfall instead of propagating this.
#[derive(Debug, Error)]
#[error("object capacity {capacity} exhausted")]
pub struct CapacityExceeded {
    pub capacity: usize,
}
