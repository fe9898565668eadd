//! Utility functions and helpers.

pub mod check;
pub mod error;
