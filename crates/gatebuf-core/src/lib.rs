//! # gatebuf-core
//!
//! Core layer for Gatebuf: exchange regimes, the buffer budget for a single
//! input gate, and the buffer-pool capability that honors it.
//!
//! This crate depends only on `gatebuf-common`.
//!
//! ## Modules
//!
//! - [`regime`] - Exchange regimes and the partition types they derive from
//! - [`budget`] - Ceiling resolution and per-gate buffer planning
//! - [`pool`] - Network buffer pools (capability trait, in-process pool, recording double)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod budget;
pub mod pool;
pub mod regime;

// Re-export commonly used types
pub use budget::{
    BufferCeiling, GateBufferPlan, GateBufferRequest, plan_gate_buffers, resolve_ceiling,
};
pub use pool::{GateReservation, LocalBufferPool, NetworkBufferPool, PoolError, RecordingPool};
pub use regime::{ExchangeRegime, PartitionType};
