use battle_core::Timestamp;

/// Current wall-clock time.
pub fn now() -> Timestamp {
    Timestamp::from_millis(chrono::Utc::now().timestamp_millis())
}
