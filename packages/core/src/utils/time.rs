// Wall-clock helpers. Timestamps are Unix milliseconds.

pub fn current_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
