//! A pool that never runs out and remembers what it was asked for.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::reservation::{GateReservation, SegmentSource};
use super::{NetworkBufferPool, PoolError};
use crate::budget::GateBufferPlan;

#[derive(Default)]
struct Recorder {
    plans: Mutex<Vec<GateBufferPlan>>,
    outstanding: Mutex<usize>,
    recycled: Notify,
}

impl SegmentSource for Recorder {
    fn try_take(&self, count: usize) -> Result<(), PoolError> {
        *self.outstanding.lock() += count;
        Ok(())
    }

    fn give_back(&self, count: usize) {
        *self.outstanding.lock() -= count;
        self.recycled.notify_waiters();
    }

    fn available(&self) -> usize {
        usize::MAX
    }

    fn recycled(&self) -> &Notify {
        &self.recycled
    }
}

/// Unlimited pool for tests: every reservation succeeds and its plan is kept.
#[derive(Clone, Default)]
pub struct RecordingPool {
    recorder: Arc<Recorder>,
}

impl RecordingPool {
    /// Creates an empty recording pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans reserved so far, oldest first.
    #[must_use]
    pub fn plans(&self) -> Vec<GateBufferPlan> {
        self.recorder.plans.lock().clone()
    }

    /// The most recently reserved plan.
    #[must_use]
    pub fn last_plan(&self) -> Option<GateBufferPlan> {
        self.recorder.plans.lock().last().copied()
    }

    /// Segments currently held by live reservations and floating buffers.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        *self.recorder.outstanding.lock()
    }
}

impl NetworkBufferPool for RecordingPool {
    fn reserve(&self, plan: &GateBufferPlan) -> Result<GateReservation, PoolError> {
        self.recorder.try_take(plan.guaranteed_buffers())?;
        self.recorder.plans.lock().push(*plan);
        Ok(GateReservation::new(
            *plan,
            Arc::clone(&self.recorder) as Arc<dyn SegmentSource>,
        ))
    }

    fn available(&self) -> usize {
        self.recorder.available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BufferCeiling, GateBufferRequest, plan_gate_buffers};
    use crate::regime::ExchangeRegime;

    #[test]
    fn test_records_plans() {
        let pool = RecordingPool::new();
        let request = GateBufferRequest::new(1000, 2, 8, ExchangeRegime::Blocking);
        let plan = plan_gate_buffers(&request, BufferCeiling::limited(1000).unwrap()).unwrap();

        let reservation = pool.reserve(&plan).unwrap();
        assert_eq!(pool.last_plan(), Some(plan));
        assert_eq!(pool.outstanding(), 1000);

        let floating: Vec<_> = (0..1001)
            .map(|_| reservation.try_request_floating().unwrap())
            .collect();
        assert_eq!(pool.outstanding(), 1001);

        drop(floating);
        drop(reservation);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.plans().len(), 1);
    }
}
