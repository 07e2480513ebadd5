//! Checkout utils

use web_time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since unix epoch, used to bust intermediary caches on reads
pub fn unix_time_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
