//! # gatebuf-engine
//!
//! Entry point for Gatebuf: network buffer configuration and input gate
//! construction on top of a shared buffer pool.
//!
//! ## Modules
//!
//! - [`config`] - Network buffer configuration options
//! - [`gate`] - Input gates and the factory that builds them

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod gate;

pub use config::NetworkBufferConfig;
pub use gate::{InputGate, InputGateFactory};
