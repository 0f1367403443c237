//! Thin wrappers over `chrono` standing in for the `TimeLib` collaborator of §6.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};

/// Current time in milliseconds since the Unix epoch.
///
/// The source collaborator reports GPS-epoch milliseconds; this workspace treats
/// Unix-epoch milliseconds as the GPS timestamp directly (both are monotonic wall-clock
/// counters for the purposes of the TTL arithmetic in §4.1), matching how the rest of
/// the crate consumes `expiration_gps_ms`.
pub fn gettime_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parses an RFC 3339 / ISO 8601 timestamp string into GPS-epoch milliseconds.
pub fn str2gpstime(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.timestamp_millis())
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%SZ")
                .ok()
                .map(|dt| dt.and_utc().timestamp_millis())
        })
}

/// Broken-down UTC "now", matching the source collaborator's `gmt_now()` shape.
pub struct GmTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

pub fn gmt_now() -> GmTime {
    let now = Utc::now();
    GmTime {
        year: now.year(),
        month: now.month(),
        day: now.day(),
        hour: now.hour(),
        minute: now.minute(),
        second: now.second(),
    }
}

/// Formats `now` as `YYYYMMDDTHHMMSSZ`, the date format required by the SigV2 signer (§4.2).
pub fn format_amz_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amz_date_format_matches_spec() {
        let dt = DateTime::parse_from_rfc3339("2024-11-07T23:42:51Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_amz_date(dt), "20241107T234251Z");
    }
}
