//! Display formatting for message and conversation timestamps.
//!
//! Timestamps are stored as [`DateTime<Utc>`] everywhere; only the UI-facing
//! records carry the formatted string.

use chrono::{DateTime, Utc};

use crate::constants::DISPLAY_TIMESTAMP_FORMAT;

/// Render a timestamp the way the UI displays it: `31-01-2025 17:45:03` (UTC).
pub fn format_display_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_display_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 31, 17, 45, 3).unwrap();
        assert_eq!(format_display_timestamp(ts), "31-01-2025 17:45:03");
    }

    #[test]
    fn test_format_pads_single_digits() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 4, 7, 9).unwrap();
        assert_eq!(format_display_timestamp(ts), "05-03-2024 04:07:09");
    }
}
