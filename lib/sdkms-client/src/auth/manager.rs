use super::{AuthMethod, BearerToken};
use crate::SdkmsError;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Lazily obtains a bearer token and keeps it until it expires.
///
/// There is no background renewal: the token is checked on every use and
/// replaced when missing or expired. The lock is never held across the
/// authentication call, so concurrent cold callers may each authenticate;
/// whichever finishes last is the one that stays cached.
pub struct TokenManager {
    auth_method: Arc<dyn AuthMethod>,
    token: RwLock<Option<Arc<BearerToken>>>,
}

impl TokenManager {
    pub fn new(auth_method: Arc<dyn AuthMethod>) -> Self {
        Self {
            auth_method,
            token: RwLock::new(None),
        }
    }

    /// Return a valid token, authenticating first if needed.
    pub async fn token(
        &self,
        http: &reqwest::Client,
        base_url: &str,
    ) -> Result<Arc<BearerToken>, SdkmsError> {
        {
            let current = self.token.read().await;
            if let Some(token) = &*current {
                if !token.is_expired() {
                    return Ok(Arc::clone(token));
                }
            }
        }

        let fresh = Arc::new(self.authenticate(http, base_url).await?);
        *self.token.write().await = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// Authenticate unconditionally, bypassing the cache.
    pub async fn authenticate(
        &self,
        http: &reqwest::Client,
        base_url: &str,
    ) -> Result<BearerToken, SdkmsError> {
        tracing::debug!("Authenticating against SDKMS");
        let token = self.auth_method.authenticate(http, base_url).await?;
        tracing::debug!(expires_in = ?token.expires_in(), "Obtained SDKMS bearer token");
        Ok(token)
    }

    /// Currently cached token, expired or not.
    pub async fn cached(&self) -> Option<Arc<BearerToken>> {
        (*self.token.read().await).clone()
    }

    /// Forget the cached token; the next `token()` call re-authenticates.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }
}
