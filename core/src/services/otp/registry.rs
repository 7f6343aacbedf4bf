//! Process-local registry of pending one-time passcodes

use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::entities::{PendingOtp, TenantId};
use crate::domain::value_objects::OtpCheck;
use crate::errors::{DomainError, DomainResult};

use super::config::OtpConfig;

type OtpKey = (TenantId, u64);

/// Mapping (tenant, user) to at most one pending code
///
/// Every operation takes the registry mutex once, so each is atomic with
/// respect to the others. Callers pass `now` explicitly; the registry
/// never reads the clock itself.
pub struct OtpRegistry {
    config: OtpConfig,
    entries: Mutex<HashMap<OtpKey, PendingOtp>>,
}

impl OtpRegistry {
    pub fn new(config: OtpConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<OtpKey, PendingOtp>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generate a numeric code with every digit drawn uniformly from the OS CSPRNG
    pub fn generate_code(length: usize) -> String {
        let mut rng = OsRng;
        (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    /// Issue a new code for `email`, replacing any previous one
    ///
    /// Fails with `DomainError::Cooldown` while an unexpired entry for the
    /// same key was sent less than the resend cooldown ago.
    pub fn issue(
        &self,
        tenant: TenantId,
        user_id: u64,
        email: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<PendingOtp> {
        let mut entries = self.entries();
        let key = (tenant, user_id);

        if let Some(existing) = entries.get(&key) {
            if !existing.is_expired(now) {
                if let Some(remaining_seconds) =
                    existing.cooldown_remaining(now, self.config.resend_cooldown())
                {
                    tracing::debug!(
                        tenant_id = %tenant,
                        user_id = user_id,
                        remaining_seconds = remaining_seconds,
                        event = "otp_cooldown",
                        "Code requested during resend cooldown"
                    );
                    return Err(DomainError::Cooldown { remaining_seconds });
                }
            }
        }

        let pending = PendingOtp::new(
            Self::generate_code(self.config.code_length),
            email,
            now,
            self.config.ttl(),
        );
        entries.insert(key, pending.clone());

        tracing::info!(
            tenant_id = %tenant,
            user_id = user_id,
            expires_at = %pending.expires_at,
            event = "otp_generated",
            "Generated new verification code"
        );
        Ok(pending)
    }

    /// Check a submitted code
    ///
    /// Expired entries are removed; a mismatch keeps the entry so the user
    /// can try again until expiry; a match consumes the entry.
    pub fn check(&self, tenant: TenantId, user_id: u64, submitted: &str, now: DateTime<Utc>) -> OtpCheck {
        let mut entries = self.entries();
        let key = (tenant, user_id);

        let Some(pending) = entries.get(&key) else {
            return OtpCheck::NotFound;
        };

        if pending.is_expired(now) {
            entries.remove(&key);
            return OtpCheck::Expired;
        }

        if !constant_time_eq(submitted.trim().as_bytes(), pending.code.as_bytes()) {
            return OtpCheck::Mismatch;
        }

        match entries.remove(&key) {
            Some(pending) => OtpCheck::Success { email: pending.email },
            None => OtpCheck::NotFound,
        }
    }

    /// Unexpired pending entry for a key, if any
    pub fn pending(&self, tenant: TenantId, user_id: u64, now: DateTime<Utc>) -> Option<PendingOtp> {
        self.entries()
            .get(&(tenant, user_id))
            .filter(|pending| !pending.is_expired(now))
            .cloned()
    }

    /// Drop every expired entry; returns how many were removed
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, pending| !pending.is_expired(now));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Default for OtpRegistry {
    fn default() -> Self {
        Self::new(OtpConfig::default())
    }
}
