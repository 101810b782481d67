//! Time utilities.
//!
//! Envelope expiry horizons are expressed as absolute Unix timestamps in
//! the transaction's time bounds, so the builder needs the current wall
//! clock in seconds.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Returns the current Unix timestamp in seconds.
///
/// If the system clock is before the Unix epoch (which should never happen
/// in practice), returns 0.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
