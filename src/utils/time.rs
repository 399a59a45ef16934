use chrono::Utc;

/// Current Unix timestamp in seconds. All lifecycle and validity-window
/// columns store epoch seconds.
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}
