//! Day/night classification for threshold selection.

use chrono::{NaiveDateTime, Timelike};

// ---

/// Daytime runs 06:00–17:59 greenhouse-local time.
const DAY_START_HOUR: u32 = 6;
const DAY_END_HOUR: u32 = 18;

/// Classify a backend timestamp as day or night.
///
/// Only the first 19 characters (`YYYY-MM-DDTHH:mm:ss`) are considered;
/// trailing offsets and fractional seconds are ignored. Missing or
/// malformed input classifies as daytime so the day thresholds apply
/// (fail-open: an unclassifiable time must not suppress alerting).
pub fn is_daytime(timestamp: Option<&str>) -> bool {
    // ---
    let Some(ts) = timestamp else {
        return true;
    };
    let Some(head) = ts.get(..19) else {
        return true;
    };
    match NaiveDateTime::parse_from_str(head, "%Y-%m-%dT%H:%M:%S") {
        Ok(dt) => (DAY_START_HOUR..DAY_END_HOUR).contains(&dt.hour()),
        Err(_) => true,
    }
}
