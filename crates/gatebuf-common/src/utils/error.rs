//! Error types for Gatebuf.

use thiserror::Error;

/// Result alias used across the Gatebuf crates.
pub type Result<T> = std::result::Result<T, Error>;

/// The top-level error type.
///
/// Buffer planning only ever fails with [`Error::InvalidConfiguration`]. The
/// remaining variants belong to the layers around it (config files, pools).
#[derive(Error, Debug)]
pub enum Error {
    /// A buffer count, channel count or ceiling violates its precondition.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The buffer pool could not honor a reservation or request.
    #[error("buffer pool error: {0}")]
    Pool(#[from] PoolError),

    /// I/O error while reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be decoded or encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal invariant broken.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error raised by a network buffer pool.
///
/// Running out of segments is a liveness condition of the pool, not a
/// configuration error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Not enough free segments in the pool.
    #[error("pool exhausted: requested {requested} segments, {available} available")]
    Exhausted {
        /// Segments asked for.
        requested: usize,
        /// Segments that were free.
        available: usize,
    },
    /// The gate already holds its maximum number of floating buffers.
    #[error("floating buffer limit of {limit} reached")]
    FloatingLimitReached {
        /// The gate's total floating bound.
        limit: usize,
    },
}

impl Error {
    /// Returns true if this is a configuration error.
    #[must_use]
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
