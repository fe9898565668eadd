//! Per-gate buffer planning.

use serde::{Deserialize, Serialize};

use gatebuf_common::utils::check::{check_argument, check_positive};
use gatebuf_common::utils::error::{Error, Result};

use super::resolver::BufferCeiling;
use crate::regime::ExchangeRegime;

/// What a gate asks for, built once at gate construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateBufferRequest {
    /// Number of upstream channels feeding the gate.
    pub channel_count: usize,
    /// Buffers permanently reserved per channel, as configured.
    pub configured_exclusive_per_channel: usize,
    /// Baseline size of the gate-wide floating pool.
    pub configured_floating_per_gate: usize,
    /// Exchange regime of the consumed partition.
    pub regime: ExchangeRegime,
    /// Operator override of the ceiling.
    pub max_required_override: Option<usize>,
}

impl GateBufferRequest {
    /// Creates a request without a ceiling override.
    #[must_use]
    pub const fn new(
        channel_count: usize,
        configured_exclusive_per_channel: usize,
        configured_floating_per_gate: usize,
        regime: ExchangeRegime,
    ) -> Self {
        Self {
            channel_count,
            configured_exclusive_per_channel,
            configured_floating_per_gate,
            regime,
            max_required_override: None,
        }
    }

    /// Sets the ceiling override.
    #[must_use]
    pub const fn with_max_required_override(mut self, buffers: usize) -> Self {
        self.max_required_override = Some(buffers);
        self
    }

    /// Checks the planner's preconditions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the channel count or the floating
    /// baseline is zero.
    pub fn validate(&self) -> Result<()> {
        check_positive(self.channel_count, "channel count")?;
        check_positive(
            self.configured_floating_per_gate,
            "floating buffers per gate",
        )?;
        Ok(())
    }
}

/// The buffer budget of one gate.
///
/// Immutable once built and only produced by [`plan_gate_buffers`], so the
/// counts always satisfy `required_floating <= total_floating` and fit in
/// `usize`. A gate with a different channel count needs a new plan.
///
/// Plans cannot be decoded from external data:
///
/// ```compile_fail
/// use gatebuf_core::budget::GateBufferPlan;
///
/// let plan: GateBufferPlan = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateBufferPlan {
    channel_count: usize,
    configured_exclusive_per_channel: usize,
    effective_exclusive_per_channel: usize,
    required_floating: usize,
    total_floating: usize,
    target_total_per_gate: usize,
}

impl GateBufferPlan {
    /// Number of channels the plan was computed for.
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Exclusive buffers per channel as configured, before capping.
    #[must_use]
    pub const fn configured_exclusive_per_channel(&self) -> usize {
        self.configured_exclusive_per_channel
    }

    /// Exclusive buffers each channel actually gets.
    #[must_use]
    pub const fn effective_exclusive_per_channel(&self) -> usize {
        self.effective_exclusive_per_channel
    }

    /// Floating buffers the pool must always be able to hand out.
    #[must_use]
    pub const fn required_floating(&self) -> usize {
        self.required_floating
    }

    /// Floating buffers the gate may hold at most.
    #[must_use]
    pub const fn total_floating(&self) -> usize {
        self.total_floating
    }

    /// Buffers the gate holds under full load.
    #[must_use]
    pub const fn target_total_per_gate(&self) -> usize {
        self.target_total_per_gate
    }

    /// Exclusive buffers across all channels.
    #[must_use]
    pub const fn exclusive_buffers_total(&self) -> usize {
        self.channel_count * self.effective_exclusive_per_channel
    }

    /// Buffers the pool must set aside when the gate is created.
    #[must_use]
    pub const fn guaranteed_buffers(&self) -> usize {
        self.exclusive_buffers_total() + self.required_floating
    }

    /// Returns true if the exclusive reservation was cut below its configured size.
    #[must_use]
    pub const fn is_capped(&self) -> bool {
        self.effective_exclusive_per_channel < self.configured_exclusive_per_channel
    }
}

/// Computes the buffer plan for a gate.
///
/// Pipelined gates always keep their configured exclusive buffers. Blocking
/// gates cap them at `(ceiling - 1) / channel_count` so that at least one
/// floating buffer fits under the ceiling; whatever is taken away from the
/// exclusive side is added to the floating pool.
///
/// # Errors
///
/// Returns `InvalidConfiguration` if a precondition on the request fails or
/// a buffer count does not fit in `usize`.
pub fn plan_gate_buffers(
    request: &GateBufferRequest,
    ceiling: BufferCeiling,
) -> Result<GateBufferPlan> {
    request.validate()?;

    let channels = request.channel_count;
    let configured_exclusive = request.configured_exclusive_per_channel;
    let configured_floating = request.configured_floating_per_gate;

    let effective_exclusive = match (request.regime, ceiling.limit()) {
        (ExchangeRegime::Blocking, Some(limit)) => {
            configured_exclusive.min((limit - 1) / channels)
        }
        _ => configured_exclusive,
    };

    let (required_floating, total_floating) = if effective_exclusive == configured_exclusive {
        (1, configured_floating)
    } else {
        // Only reachable with a limited ceiling
        let limit = ceiling.as_count();
        let reclaimed = mul(channels, configured_exclusive - effective_exclusive)?;
        let total = add(reclaimed, configured_floating)?;
        let required = limit - channels * effective_exclusive;

        tracing::warn!(
            channels,
            configured_exclusive,
            effective_exclusive,
            ceiling = limit,
            "exclusive buffers capped for high fan-in gate, {} buffers moved to floating pool",
            reclaimed
        );
        (required, total)
    };

    let target_total_per_gate = add(mul(channels, effective_exclusive)?, total_floating)?;

    check_argument(required_floating <= total_floating, || {
        format!("required floating buffers {required_floating} exceed total {total_floating}")
    })?;

    let plan = GateBufferPlan {
        channel_count: channels,
        configured_exclusive_per_channel: configured_exclusive,
        effective_exclusive_per_channel: effective_exclusive,
        required_floating,
        total_floating,
        target_total_per_gate,
    };

    tracing::debug!(
        regime = %request.regime,
        %ceiling,
        channels,
        exclusive = plan.effective_exclusive_per_channel,
        required_floating = plan.required_floating,
        total_floating = plan.total_floating,
        target = plan.target_total_per_gate,
        "computed gate buffer plan"
    );

    Ok(plan)
}

fn mul(a: usize, b: usize) -> Result<usize> {
    a.checked_mul(b)
        .ok_or_else(|| Error::InvalidConfiguration(format!("buffer count {a} * {b} overflows")))
}

fn add(a: usize, b: usize) -> Result<usize> {
    a.checked_add(b)
        .ok_or_else(|| Error::InvalidConfiguration(format!("buffer count {a} + {b} overflows")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::resolve_ceiling;
    use crate::regime::PartitionType;
    use proptest::prelude::*;

    const FLOATING: usize = 8;
    const EXCLUSIVE: usize = 2;

    fn plan_for(channels: usize, kind: PartitionType, exclusive: usize) -> GateBufferPlan {
        let request = GateBufferRequest::new(channels, exclusive, FLOATING, kind.regime());
        let ceiling = resolve_ceiling(request.regime, None).unwrap();
        plan_gate_buffers(&request, ceiling).unwrap()
    }

    fn check_buffers_in_gate(
        plan: &GateBufferPlan,
        required_floating: usize,
        total_floating: usize,
        exclusive_per_channel: usize,
        target_total: usize,
    ) {
        assert_eq!(plan.required_floating(), required_floating);
        assert_eq!(plan.total_floating(), total_floating);
        assert_eq!(plan.effective_exclusive_per_channel(), exclusive_per_channel);
        assert_eq!(plan.target_total_per_gate(), target_total);
    }

    #[test]
    fn test_sufficient_required_buffers() {
        for kind in PartitionType::ALL {
            let plan = plan_for(499, kind, EXCLUSIVE);
            check_buffers_in_gate(&plan, 1, 8, 2, 1006);
            assert!(!plan.is_capped());
        }
    }

    #[test]
    fn test_one_exclusive_buffer() {
        for kind in PartitionType::ALL {
            let plan = plan_for(500, kind, EXCLUSIVE);
            if kind.regime().is_pipelined() {
                check_buffers_in_gate(&plan, 1, 8, 2, 1008);
            } else {
                check_buffers_in_gate(&plan, 500, 508, 1, 1008);
                assert!(plan.is_capped());
            }
        }
    }

    #[test]
    fn test_upper_boundary_with_one_exclusive_buffer() {
        for kind in PartitionType::ALL {
            let plan = plan_for(999, kind, EXCLUSIVE);
            if kind.regime().is_pipelined() {
                check_buffers_in_gate(&plan, 1, 8, 2, 2006);
            } else {
                check_buffers_in_gate(&plan, 1, 1007, 1, 2006);
            }
        }
    }

    #[test]
    fn test_boundary_without_exclusive_buffer() {
        for kind in PartitionType::ALL {
            let plan = plan_for(1000, kind, EXCLUSIVE);
            if kind.regime().is_pipelined() {
                check_buffers_in_gate(&plan, 1, 8, 2, 2008);
            } else {
                check_buffers_in_gate(&plan, 1000, 2008, 0, 2008);
            }
        }
    }

    #[test]
    fn test_configured_zero_exclusive_buffers() {
        for kind in PartitionType::ALL {
            let plan = plan_for(1001, kind, 0);
            check_buffers_in_gate(&plan, 1, 8, 0, 8);
            assert!(!plan.is_capped());
        }
    }

    #[test]
    fn test_pipelined_ignores_override() {
        let request = GateBufferRequest::new(5000, 4, FLOATING, ExchangeRegime::Pipelined)
            .with_max_required_override(10);
        let ceiling = resolve_ceiling(request.regime, request.max_required_override).unwrap();
        let plan = plan_gate_buffers(&request, ceiling).unwrap();
        check_buffers_in_gate(&plan, 1, 8, 4, 5000 * 4 + 8);
    }

    #[test]
    fn test_blocking_with_unbounded_ceiling() {
        let request = GateBufferRequest::new(100_000, 2, FLOATING, ExchangeRegime::Blocking);
        let plan = plan_gate_buffers(&request, BufferCeiling::Unbounded).unwrap();
        assert_eq!(plan.effective_exclusive_per_channel(), 2);
        assert_eq!(plan.required_floating(), 1);
    }

    #[test]
    fn test_ceiling_of_one() {
        let request = GateBufferRequest::new(3, 2, FLOATING, ExchangeRegime::Blocking);
        let plan = plan_gate_buffers(&request, BufferCeiling::limited(1).unwrap()).unwrap();
        check_buffers_in_gate(&plan, 1, 3 * 2 + 8, 0, 14);
    }

    #[test]
    fn test_invalid_requests() {
        let ceiling = BufferCeiling::limited(1000).unwrap();

        let zero_channels = GateBufferRequest::new(0, 2, FLOATING, ExchangeRegime::Blocking);
        assert!(
            plan_gate_buffers(&zero_channels, ceiling)
                .unwrap_err()
                .is_invalid_configuration()
        );

        let zero_floating = GateBufferRequest::new(10, 2, 0, ExchangeRegime::Pipelined);
        assert!(
            plan_gate_buffers(&zero_floating, ceiling)
                .unwrap_err()
                .is_invalid_configuration()
        );
    }

    #[test]
    fn test_overflow_is_reported() {
        let request = GateBufferRequest::new(usize::MAX, 2, FLOATING, ExchangeRegime::Pipelined);
        let err = plan_gate_buffers(&request, BufferCeiling::Unbounded).unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_approximate_partition_is_capped() {
        let plan = plan_for(500, PartitionType::PipelinedApproximate, EXCLUSIVE);
        check_buffers_in_gate(&plan, 500, 508, 1, 1008);
        assert!(plan.is_capped());
    }

    #[test]
    fn test_guaranteed_buffers_never_overflow() {
        // Largest channel count whose target still fits
        let channels = (usize::MAX - FLOATING) / EXCLUSIVE;
        let request =
            GateBufferRequest::new(channels, EXCLUSIVE, FLOATING, ExchangeRegime::Pipelined);
        let plan = plan_gate_buffers(&request, BufferCeiling::Unbounded).unwrap();
        assert_eq!(plan.guaranteed_buffers(), channels * EXCLUSIVE + 1);
        assert!(plan.guaranteed_buffers() <= plan.target_total_per_gate());
    }

    #[test]
    fn test_guaranteed_buffers() {
        let plan = plan_for(500, PartitionType::Blocking, EXCLUSIVE);
        assert_eq!(plan.exclusive_buffers_total(), 500);
        assert_eq!(plan.guaranteed_buffers(), 1000);
    }

    fn any_regime() -> impl Strategy<Value = ExchangeRegime> {
        prop_oneof![Just(ExchangeRegime::Pipelined), Just(ExchangeRegime::Blocking)]
    }

    proptest! {
        #[test]
        fn plan_respects_bounds(
            channels in 1usize..5000,
            exclusive in 0usize..16,
            floating in 1usize..64,
            limit in 1usize..5000,
            regime in any_regime(),
        ) {
            let request = GateBufferRequest::new(channels, exclusive, floating, regime);
            let plan = plan_gate_buffers(&request, BufferCeiling::limited(limit).unwrap()).unwrap();

            prop_assert!(plan.required_floating() >= 1);
            prop_assert!(plan.required_floating() <= plan.total_floating());
            prop_assert!(plan.effective_exclusive_per_channel() <= exclusive);
            prop_assert_eq!(
                plan.target_total_per_gate(),
                channels * plan.effective_exclusive_per_channel() + plan.total_floating()
            );
            if plan.is_capped() {
                prop_assert_eq!(
                    channels * exclusive - channels * plan.effective_exclusive_per_channel(),
                    plan.total_floating() - floating
                );
                prop_assert_eq!(plan.guaranteed_buffers(), limit);
            }
        }

        #[test]
        fn pipelined_is_never_capped(
            channels in 1usize..100_000,
            exclusive in 0usize..16,
            floating in 1usize..64,
            limit in proptest::option::of(1usize..5000),
        ) {
            let request = GateBufferRequest::new(channels, exclusive, floating, ExchangeRegime::Pipelined);
            let ceiling = resolve_ceiling(request.regime, limit).unwrap();
            let plan = plan_gate_buffers(&request, ceiling).unwrap();

            prop_assert_eq!(plan.effective_exclusive_per_channel(), exclusive);
            prop_assert_eq!(plan.required_floating(), 1);
            prop_assert_eq!(plan.total_floating(), floating);
        }

        #[test]
        fn blocking_exclusive_is_monotonic(
            channels in 1usize..5000,
            exclusive in 0usize..16,
            limit in 1usize..5000,
        ) {
            let ceiling = BufferCeiling::limited(limit).unwrap();
            let smaller = GateBufferRequest::new(channels, exclusive, 8, ExchangeRegime::Blocking);
            let larger = GateBufferRequest::new(channels + 1, exclusive, 8, ExchangeRegime::Blocking);
            let a = plan_gate_buffers(&smaller, ceiling).unwrap();
            let b = plan_gate_buffers(&larger, ceiling).unwrap();

            prop_assert!(b.effective_exclusive_per_channel() <= a.effective_exclusive_per_channel());
            if channels >= limit {
                prop_assert_eq!(a.effective_exclusive_per_channel(), 0);
            }
        }
    }
}
