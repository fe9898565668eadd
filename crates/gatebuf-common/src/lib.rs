//! # gatebuf-common
//!
//! Foundation layer for Gatebuf: the error taxonomy and small helpers shared
//! by every other crate.
//!
//! This crate has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`utils`] - Utility functions and helpers (errors, argument checks)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod utils;

// Re-export commonly used types at crate root
pub use utils::error::{Error, PoolError, Result};
