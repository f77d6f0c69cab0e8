use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the epoch; negative for times before it.
pub(crate) fn unix_secs(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

/// Seconds since the epoch of `t` shifted by a signed number of seconds, saturating at the
/// ends of the `i64` range.
pub(crate) fn offset_secs(t: SystemTime, secs: i64) -> i64 {
    unix_secs(t).saturating_add(secs)
}
