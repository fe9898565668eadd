//! Argument checks that fail with [`Error::InvalidConfiguration`].

use super::error::{Error, Result};

/// Fails with `InvalidConfiguration` unless `condition` holds.
///
/// The message is only built on failure.
///
/// # Examples
///
/// ```
/// use gatebuf_common::utils::check::check_argument;
///
/// assert!(check_argument(3 > 0, || "must be positive".to_string()).is_ok());
/// assert!(check_argument(0 > 0, || "must be positive".to_string()).is_err());
/// ```
pub fn check_argument(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration(message()))
    }
}

/// Checks that a count is strictly positive and returns it.
pub fn check_positive(value: usize, what: &str) -> Result<usize> {
    check_argument(value > 0, || format!("{what} must be positive, got {value}"))?;
    Ok(value)
}

/// Converts a signed configuration value into a count, rejecting negatives.
pub fn non_negative(value: i64, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::InvalidConfiguration(format!("{what} must not be negative, got {value}")))
}

/// Converts a signed configuration value into a strictly positive count.
pub fn positive(value: i64, what: &str) -> Result<usize> {
    check_argument(value > 0, || format!("{what} must be positive, got {value}"))?;
    non_negative(value, what)
}
