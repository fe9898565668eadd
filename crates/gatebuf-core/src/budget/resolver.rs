//! Resolution of the per-gate ceiling on required buffers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

use gatebuf_common::utils::error::{Error, Result};

use crate::regime::ExchangeRegime;

/// Default ceiling for gates consuming bounded (blocking) partitions.
pub const DEFAULT_MAX_REQUIRED_BUFFERS_PER_GATE_FOR_BATCH: usize = 1000;

const BATCH_CEILING: NonZeroUsize =
    match NonZeroUsize::new(DEFAULT_MAX_REQUIRED_BUFFERS_PER_GATE_FOR_BATCH) {
        Some(buffers) => buffers,
        None => panic!("batch ceiling must be positive"),
    };

/// The maximum number of buffers a gate may require up front.
///
/// Pipelined gates default to [`BufferCeiling::Unbounded`]: no cap applies,
/// so there is no sentinel value to overflow in the capping arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferCeiling {
    /// At most this many buffers.
    Limited(NonZeroUsize),
    /// No ceiling.
    Unbounded,
}

impl BufferCeiling {
    /// Creates a limited ceiling, rejecting zero.
    pub fn limited(buffers: usize) -> Result<Self> {
        NonZeroUsize::new(buffers).map(Self::Limited).ok_or_else(|| {
            Error::InvalidConfiguration(
                "max required buffers per gate must be positive, got 0".to_string(),
            )
        })
    }

    /// Returns the limit, or `None` when unbounded.
    #[must_use]
    pub const fn limit(self) -> Option<usize> {
        match self {
            Self::Limited(n) => Some(n.get()),
            Self::Unbounded => None,
        }
    }

    /// Returns the limit as a count, saturating to `usize::MAX` when unbounded.
    #[must_use]
    pub const fn as_count(self) -> usize {
        match self {
            Self::Limited(n) => n.get(),
            Self::Unbounded => usize::MAX,
        }
    }
}

impl fmt::Display for BufferCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Resolves the effective ceiling for a gate.
///
/// A present override always wins and is returned unchanged. Otherwise
/// blocking gates get [`DEFAULT_MAX_REQUIRED_BUFFERS_PER_GATE_FOR_BATCH`] and
/// pipelined gates get [`BufferCeiling::Unbounded`].
///
/// # Errors
///
/// Returns `InvalidConfiguration` if the override is zero.
pub fn resolve_ceiling(
    regime: ExchangeRegime,
    max_required_override: Option<usize>,
) -> Result<BufferCeiling> {
    if let Some(buffers) = max_required_override {
        return BufferCeiling::limited(buffers);
    }

    Ok(match regime {
        ExchangeRegime::Pipelined => BufferCeiling::Unbounded,
        ExchangeRegime::Blocking => BufferCeiling::Limited(BATCH_CEILING),
    })
}
