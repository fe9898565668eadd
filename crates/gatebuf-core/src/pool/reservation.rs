//! Gate reservations and floating buffer guards.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use super::PoolError;
use crate::budget::GateBufferPlan;

/// Raw segment accounting behind a pool.
pub trait SegmentSource: Send + Sync {
    /// Takes `count` segments if they are all free.
    fn try_take(&self, count: usize) -> Result<(), PoolError>;

    /// Returns `count` segments.
    fn give_back(&self, count: usize);

    /// Number of free segments.
    fn available(&self) -> usize;

    /// Notified whenever segments are given back.
    fn recycled(&self) -> &Notify;
}

/// The share of a pool held by one gate.
///
/// Holds `plan.guaranteed_buffers()` segments for its whole lifetime and up
/// to `plan.total_floating() - plan.required_floating()` more while floating
/// buffers are out. Dropping it returns the guaranteed segments.
pub struct GateReservation {
    plan: GateBufferPlan,
    source: Arc<dyn SegmentSource>,
    /// Floating buffers currently handed out.
    floating_in_use: Mutex<usize>,
}

impl GateReservation {
    /// Wraps segments already taken from `source` for `plan`.
    pub fn new(plan: GateBufferPlan, source: Arc<dyn SegmentSource>) -> Self {
        Self {
            plan,
            source,
            floating_in_use: Mutex::new(0),
        }
    }

    /// The plan this reservation honors.
    #[must_use]
    pub fn plan(&self) -> &GateBufferPlan {
        &self.plan
    }

    /// Exclusive buffers held for each channel.
    #[must_use]
    pub fn exclusive_per_channel(&self) -> usize {
        self.plan.effective_exclusive_per_channel()
    }

    /// Floating buffers currently handed out.
    #[must_use]
    pub fn floating_in_use(&self) -> usize {
        *self.floating_in_use.lock()
    }

    /// Hands out one floating buffer without waiting.
    ///
    /// The first `required_floating` buffers come out of the guaranteed share
    /// and always succeed; the rest are drawn from the shared pool.
    ///
    /// # Errors
    ///
    /// Returns `FloatingLimitReached` once `total_floating` buffers are out,
    /// or `Exhausted` if the shared pool is empty.
    pub fn try_request_floating(&self) -> Result<FloatingBuffer<'_>, PoolError> {
        let mut in_use = self.floating_in_use.lock();
        if *in_use >= self.plan.total_floating() {
            return Err(PoolError::FloatingLimitReached {
                limit: self.plan.total_floating(),
            });
        }
        if *in_use >= self.plan.required_floating() {
            self.source.try_take(1)?;
        }
        *in_use += 1;
        Ok(FloatingBuffer { reservation: self })
    }

    /// Hands out one floating buffer, waiting for the shared pool to refill.
    ///
    /// # Errors
    ///
    /// Returns `FloatingLimitReached` once `total_floating` buffers are out.
    /// Pool exhaustion is waited out, not reported.
    pub async fn request_floating(&self) -> Result<FloatingBuffer<'_>, PoolError> {
        loop {
            let notified = self.source.recycled().notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_request_floating() {
                Err(PoolError::Exhausted { .. }) => notified.await,
                result => return result,
            }
        }
    }

    fn recycle_floating(&self) {
        let mut in_use = self.floating_in_use.lock();
        *in_use -= 1;
        if *in_use >= self.plan.required_floating() {
            self.source.give_back(1);
        }
    }
}

impl fmt::Debug for GateReservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateReservation")
            .field("plan", &self.plan)
            .field("floating_in_use", &self.floating_in_use())
            .finish_non_exhaustive()
    }
}

impl Drop for GateReservation {
    fn drop(&mut self) {
        self.source.give_back(self.plan.guaranteed_buffers());
    }
}

/// A floating buffer checked out of a [`GateReservation`].
#[derive(Debug)]
pub struct FloatingBuffer<'a> {
    reservation: &'a GateReservation,
}

impl Drop for FloatingBuffer<'_> {
    fn drop(&mut self) {
        self.reservation.recycle_floating();
    }
}
