/// Application name
pub const APP_NAME: &str = "Causerie";

/// Number of participants in a direct (one-to-one) conversation
pub const DIRECT_PARTICIPANTS: usize = 2;

/// Minimum number of participants in a group conversation
pub const GROUP_MIN_PARTICIPANTS: usize = 3;

/// Default cap on group conversation size
pub const DEFAULT_MAX_PARTICIPANTS: usize = 10;

/// Maximum group name length in characters, after trimming
pub const GROUP_NAME_MAX_CHARS: usize = 100;

/// Default history poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Display timestamp format: day-month-year hours:minutes:seconds, UTC
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Suffix appended to a recents display name that collides with an earlier one
pub const DUPLICATE_NAME_SUFFIX: &str = "(copy)";
