//! Exchange regimes.
//!
//! Every input gate consumes exactly one kind of result partition. The kind
//! decides the [`ExchangeRegime`], which in turn decides whether the gate's
//! exclusive buffers may be capped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use gatebuf_common::utils::error::Error;

/// How data moves across an exchange edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeRegime {
    /// Data streams continuously; backpressure relies on per-channel credit.
    Pipelined,
    /// Data is materialized first and consumed as a bounded partition.
    Blocking,
}

impl ExchangeRegime {
    /// Returns true for the pipelined regime.
    #[must_use]
    pub const fn is_pipelined(self) -> bool {
        matches!(self, Self::Pipelined)
    }
}

impl fmt::Display for ExchangeRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipelined => f.write_str("pipelined"),
            Self::Blocking => f.write_str("blocking"),
        }
    }
}

/// The kind of result partition a gate consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionType {
    /// Fully produced before consumption, released after one read.
    Blocking,
    /// Fully produced before consumption, kept for repeated reads.
    BlockingPersistent,
    /// Streamed with an unbounded local buffer.
    Pipelined,
    /// Streamed with a bounded local buffer.
    PipelinedBounded,
    /// Streamed, tolerating data loss on failover.
    PipelinedApproximate,
    /// Spilled in full, consumable while still being produced.
    HybridFull,
    /// Spilled selectively, consumable while still being produced.
    HybridSelective,
}

impl PartitionType {
    /// Every partition type.
    pub const ALL: [Self; 7] = [
        Self::Blocking,
        Self::BlockingPersistent,
        Self::Pipelined,
        Self::PipelinedBounded,
        Self::PipelinedApproximate,
        Self::HybridFull,
        Self::HybridSelective,
    ];

    /// Returns the exchange regime for gates consuming this partition type.
    ///
    /// Only `Pipelined` and `PipelinedBounded` need guaranteed per-channel
    /// credit. Approximate, blocking and hybrid kinds are served from shared
    /// buffers and fall under the batch ceiling.
    #[must_use]
    pub const fn regime(self) -> ExchangeRegime {
        match self {
            Self::Pipelined | Self::PipelinedBounded => ExchangeRegime::Pipelined,
            Self::Blocking
            | Self::BlockingPersistent
            | Self::PipelinedApproximate
            | Self::HybridFull
            | Self::HybridSelective => ExchangeRegime::Blocking,
        }
    }

    /// Returns the snake_case name used on the command line and in config files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::BlockingPersistent => "blocking_persistent",
            Self::Pipelined => "pipelined",
            Self::PipelinedBounded => "pipelined_bounded",
            Self::PipelinedApproximate => "pipelined_approximate",
            Self::HybridFull => "hybrid_full",
            Self::HybridSelective => "hybrid_selective",
        }
    }
}

impl fmt::Display for PartitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PartitionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| Error::InvalidConfiguration(format!("unknown partition type: {s}")))
    }
}
