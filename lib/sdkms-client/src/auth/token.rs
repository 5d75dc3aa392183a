use std::fmt;
use std::time::{Duration, Instant};

/// Lifetime assumed when the auth response carries no `expires_in`.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(600);

/// Bearer token obtained from SDKMS.
///
/// Never mutated after construction: a refresh builds a new value.
#[derive(Clone)]
pub struct BearerToken {
    value: String,
    expires_at: Instant,
}

impl BearerToken {
    pub fn new(value: impl Into<String>, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value: value.into(),
            expires_at: now
                .checked_add(ttl)
                .unwrap_or_else(|| now + DEFAULT_TOKEN_TTL),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn expires_in(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"<redacted>")
            .field("expires_in", &self.expires_in())
            .finish()
    }
}
