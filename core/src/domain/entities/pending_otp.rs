//! In-flight one-time passcode, held in process memory only.

use chrono::{DateTime, Duration, Utc};

/// Code waiting to be confirmed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOtp {
    /// Fixed-length numeric code
    pub code: String,

    /// Candidate address, not yet committed to the ledger
    pub email: String,

    pub expires_at: DateTime<Utc>,
    pub last_sent_at: DateTime<Utc>,
}

impl PendingOtp {
    pub fn new(code: String, email: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            code,
            email: email.into(),
            expires_at: now + ttl,
            last_sent_at: now,
        }
    }

    /// Strictly past the expiry instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whole seconds left before another code may be sent, if still cooling down
    ///
    /// Rounds up so callers never report `0s` while the cooldown still holds.
    pub fn cooldown_remaining(&self, now: DateTime<Utc>, cooldown: Duration) -> Option<i64> {
        let elapsed = now - self.last_sent_at;
        if elapsed >= cooldown {
            return None;
        }
        let remaining_ms = (cooldown - elapsed).num_milliseconds();
        Some(((remaining_ms + 999) / 1000).max(1))
    }

    /// Instant at which the cooldown ends
    pub fn resend_available_at(&self, cooldown: Duration) -> DateTime<Utc> {
        self.last_sent_at + cooldown
    }
}
