//! Network buffer pools.
//!
//! A pool owns a fixed number of memory segments shared by every gate in the
//! process. Gates never talk to it segment by segment for their guaranteed
//! share: [`NetworkBufferPool::reserve`] takes a [`GateBufferPlan`] and sets
//! aside the exclusive buffers plus the required floating minimum in one go.
//! Floating buffers beyond that minimum compete for what is left.
//!
//! # Architecture
//!
//! - [`NetworkBufferPool`] - Capability trait (reserve, query available)
//! - [`GateReservation`] - A gate's share; returns every segment when dropped
//! - [`FloatingBuffer`] - One floating buffer; recycled when dropped
//! - [`LocalBufferPool`] - In-process pool over a fixed segment count
//! - [`RecordingPool`] - Unlimited pool that records the plans it was given
//!
//! [`GateBufferPlan`]: crate::budget::GateBufferPlan

mod local;
mod recording;
mod reservation;

pub use local::LocalBufferPool;
pub use recording::RecordingPool;
pub use reservation::{FloatingBuffer, GateReservation, SegmentSource};

pub use gatebuf_common::utils::error::PoolError;

use crate::budget::GateBufferPlan;

/// The capability a gate needs from the process-wide segment pool.
pub trait NetworkBufferPool: Send + Sync {
    /// Sets aside the guaranteed buffers of `plan` for one gate.
    fn reserve(&self, plan: &GateBufferPlan) -> Result<GateReservation, PoolError>;

    /// Returns the number of free segments.
    fn available(&self) -> usize;
}
