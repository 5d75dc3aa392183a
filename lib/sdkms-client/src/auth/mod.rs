mod api_key;
mod manager;
mod token;

pub use api_key::ApiKeyAuth;
pub use manager::TokenManager;
pub use token::{BearerToken, DEFAULT_TOKEN_TTL};

use crate::SdkmsError;
use async_trait::async_trait;

/// Trait for authentication methods
#[async_trait]
pub trait AuthMethod: Send + Sync {
    /// Obtain a new bearer token. Every call hits the server.
    async fn authenticate(
        &self,
        http: &reqwest::Client,
        base_url: &str,
    ) -> Result<BearerToken, SdkmsError>;
}
