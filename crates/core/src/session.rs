//! Persisted evidence of an active login

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client-side session record, shared by every tab of one browser profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Access token expiry, epoch milliseconds
    pub token_expiry_ms: i64,
    /// Stable for the lifetime of one login
    pub session_id: String,
    /// Last detected user activity, epoch milliseconds
    pub last_activity_ms: i64,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>, token_expiry_ms: i64, now_ms: i64) -> Self {
        Self {
            token_expiry_ms,
            session_id: session_id.into(),
            last_activity_ms: now_ms,
        }
    }

    /// Milliseconds left before the access token expires, negative once it has
    pub const fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.token_expiry_ms - now_ms
    }

    pub const fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.token_expiry_ms
    }

    /// True inside the proactive refresh window but before expiry
    pub fn needs_refresh(&self, now_ms: i64, buffer: Duration) -> bool {
        !self.is_expired(now_ms) && self.remaining_ms(now_ms) <= duration_ms(buffer)
    }
}

/// Saturating conversion for adding durations to epoch millisecond stamps
pub fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
