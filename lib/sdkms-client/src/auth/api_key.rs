use super::{AuthMethod, BearerToken, DEFAULT_TOKEN_TTL};
use crate::SdkmsError;
use crate::models::AuthResponse;
use async_trait::async_trait;
use std::time::Duration;

/// App API key authentication.
///
/// The key is the base64 `app_id:secret` pair handed out by SDKMS and is sent
/// as-is in a `Basic` authorization header.
pub struct ApiKeyAuth {
    api_key: Option<String>,
}

impl ApiKeyAuth {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl AuthMethod for ApiKeyAuth {
    async fn authenticate(
        &self,
        http: &reqwest::Client,
        base_url: &str,
    ) -> Result<BearerToken, SdkmsError> {
        let url = format!("{}/sys/v1/session/auth", base_url);
        let api_key = self.api_key.as_deref().unwrap_or_default();

        let response = http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", api_key))
            .send()
            .await
            .map_err(|e| SdkmsError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SdkmsError::from_response(response).await);
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| SdkmsError::Auth(format!("Invalid response: {}", e)))?;

        let ttl = auth
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);

        Ok(BearerToken::new(auth.access_token, ttl))
    }
}
