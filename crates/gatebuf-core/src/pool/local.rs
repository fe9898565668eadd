//! In-process buffer pool over a fixed number of segments.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::reservation::{GateReservation, SegmentSource};
use super::{NetworkBufferPool, PoolError};
use crate::budget::GateBufferPlan;

struct Segments {
    total: usize,
    free: Mutex<usize>,
    recycled: Notify,
}

impl SegmentSource for Segments {
    fn try_take(&self, count: usize) -> Result<(), PoolError> {
        let mut free = self.free.lock();
        if *free < count {
            return Err(PoolError::Exhausted {
                requested: count,
                available: *free,
            });
        }
        *free -= count;
        Ok(())
    }

    fn give_back(&self, count: usize) {
        if count == 0 {
            return;
        }
        {
            let mut free = self.free.lock();
            *free += count;
            debug_assert!(*free <= self.total, "more segments returned than taken");
        }
        self.recycled.notify_waiters();
    }

    fn available(&self) -> usize {
        *self.free.lock()
    }

    fn recycled(&self) -> &Notify {
        &self.recycled
    }
}

/// A pool of `total` segments shared by every gate created against it.
///
/// Cloning is cheap; clones share the same segments.
#[derive(Clone)]
pub struct LocalBufferPool {
    segments: Arc<Segments>,
}

impl LocalBufferPool {
    /// Creates a pool with `total_segments` free segments.
    #[must_use]
    pub fn new(total_segments: usize) -> Self {
        Self {
            segments: Arc::new(Segments {
                total: total_segments,
                free: Mutex::new(total_segments),
                recycled: Notify::new(),
            }),
        }
    }

    /// Number of segments the pool was created with.
    #[must_use]
    pub fn total_segments(&self) -> usize {
        self.segments.total
    }
}

impl std::fmt::Debug for LocalBufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBufferPool")
            .field("total", &self.segments.total)
            .field("available", &self.segments.available())
            .finish()
    }
}

impl NetworkBufferPool for LocalBufferPool {
    fn reserve(&self, plan: &GateBufferPlan) -> Result<GateReservation, PoolError> {
        let guaranteed = plan.guaranteed_buffers();
        self.segments.try_take(guaranteed)?;

        tracing::debug!(
            guaranteed,
            remaining = self.segments.available(),
            "reserved gate buffers"
        );

        Ok(GateReservation::new(
            *plan,
            Arc::clone(&self.segments) as Arc<dyn SegmentSource>,
        ))
    }

    fn available(&self) -> usize {
        self.segments.available()
    }
}
