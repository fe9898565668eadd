//! Buffer budgeting for input gates.
//!
//! An input gate receives data from `N` upstream channels. Its buffers come
//! in two kinds:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      Input Gate                          │
//! │  ┌───────────┬───────────┬───────────┬───────────┐       │
//! │  │ channel 0 │ channel 1 │    ...    │ channel N │       │
//! │  │ exclusive │ exclusive │           │ exclusive │       │
//! │  └───────────┴───────────┴───────────┴───────────┘       │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │ floating pool  [required .. total]             │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Planning is two steps, both pure:
//!
//! 1. [`resolve_ceiling`] turns an optional override and the regime into a
//!    [`BufferCeiling`].
//! 2. [`plan_gate_buffers`] turns a [`GateBufferRequest`] and the ceiling
//!    into an immutable [`GateBufferPlan`].
//!
//! # Usage
//!
//! ```
//! use gatebuf_core::budget::{GateBufferRequest, plan_gate_buffers, resolve_ceiling};
//! use gatebuf_core::regime::ExchangeRegime;
//!
//! let request = GateBufferRequest::new(500, 2, 8, ExchangeRegime::Blocking);
//! let ceiling = resolve_ceiling(request.regime, request.max_required_override)?;
//! let plan = plan_gate_buffers(&request, ceiling)?;
//!
//! assert_eq!(plan.effective_exclusive_per_channel(), 1);
//! assert_eq!(plan.required_floating(), 500);
//! assert_eq!(plan.total_floating(), 508);
//! # Ok::<(), gatebuf_common::Error>(())
//! ```

mod planner;
mod resolver;

pub use planner::{GateBufferPlan, GateBufferRequest, plan_gate_buffers};
pub use resolver::{
    BufferCeiling, DEFAULT_MAX_REQUIRED_BUFFERS_PER_GATE_FOR_BATCH, resolve_ceiling,
};
