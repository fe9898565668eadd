//! Input gates and their construction.

use std::sync::Arc;

use gatebuf_common::utils::error::Result;
use gatebuf_core::budget::{BufferCeiling, GateBufferPlan};
use gatebuf_core::pool::{GateReservation, NetworkBufferPool};
use gatebuf_core::regime::{ExchangeRegime, PartitionType};

use crate::config::NetworkBufferConfig;

/// The receiving end of one exchange edge.
///
/// Holds its buffer reservation for as long as it lives. A gate is never
/// resized: a new channel count means a new gate, see
/// [`InputGateFactory::rebuild`].
#[derive(Debug)]
pub struct InputGate {
    partition_type: PartitionType,
    ceiling: BufferCeiling,
    reservation: GateReservation,
}

impl InputGate {
    /// The kind of partition this gate consumes.
    #[must_use]
    pub fn partition_type(&self) -> PartitionType {
        self.partition_type
    }

    /// The exchange regime of the consumed partition.
    #[must_use]
    pub fn regime(&self) -> ExchangeRegime {
        self.partition_type.regime()
    }

    /// Number of upstream channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.plan().channel_count()
    }

    /// The ceiling the plan was computed against.
    #[must_use]
    pub fn ceiling(&self) -> BufferCeiling {
        self.ceiling
    }

    /// The gate's buffer plan.
    #[must_use]
    pub fn plan(&self) -> &GateBufferPlan {
        self.reservation.plan()
    }

    /// The gate's share of the buffer pool.
    #[must_use]
    pub fn reservation(&self) -> &GateReservation {
        &self.reservation
    }
}

/// Builds input gates against a shared buffer pool.
pub struct InputGateFactory {
    config: NetworkBufferConfig,
    pool: Arc<dyn NetworkBufferPool>,
}

impl InputGateFactory {
    /// Creates a factory, checking the configuration up front.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration is invalid.
    pub fn new(config: NetworkBufferConfig, pool: Arc<dyn NetworkBufferPool>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, pool })
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &NetworkBufferConfig {
        &self.config
    }

    /// Computes the plan a gate would get, without reserving anything.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `channel_count` is zero.
    pub fn plan(
        &self,
        partition_type: PartitionType,
        channel_count: usize,
    ) -> Result<(BufferCeiling, GateBufferPlan)> {
        self.config.plan_gate(partition_type, channel_count)
    }

    /// Creates a gate and reserves its guaranteed buffers.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `channel_count` is zero, or a pool
    /// error if the guaranteed buffers are not available.
    pub fn create(&self, partition_type: PartitionType, channel_count: usize) -> Result<InputGate> {
        let (ceiling, plan) = self.plan(partition_type, channel_count)?;
        let reservation = self.pool.reserve(&plan)?;

        tracing::info!(
            %partition_type,
            channels = channel_count,
            exclusive_per_channel = plan.effective_exclusive_per_channel(),
            required_floating = plan.required_floating(),
            total_floating = plan.total_floating(),
            "input gate created"
        );

        Ok(InputGate {
            partition_type,
            ceiling,
            reservation,
        })
    }

    /// Replaces `gate` with a new gate for `channel_count` channels.
    ///
    /// The old reservation is released before the new one is taken.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create). The old gate is gone either way.
    pub fn rebuild(&self, gate: InputGate, channel_count: usize) -> Result<InputGate> {
        let partition_type = gate.partition_type;
        tracing::debug!(
            %partition_type,
            from = gate.channel_count(),
            to = channel_count,
            "rebuilding input gate"
        );
        drop(gate);
        self.create(partition_type, channel_count)
    }
}

impl std::fmt::Debug for InputGateFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputGateFactory")
            .field("config", &self.config)
            .field("available", &self.pool.available())
            .finish()
    }
}
