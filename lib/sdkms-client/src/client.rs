use crate::auth::{ApiKeyAuth, AuthMethod, BearerToken, TokenManager};
use crate::error::SdkmsError;
use crate::models::SecurityObject;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// CA bundle used to verify the SDKMS server certificate.
pub const DEFAULT_CA_CERT_PATH: &str = "/etc/ssl/certs/ca-certificates.crt";

pub struct SdkmsClientBuilder {
    host: Option<String>,
    api_key: Option<String>,
    ca_cert_path: PathBuf,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    auth_method: Option<Arc<dyn AuthMethod>>,
}

impl Default for SdkmsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SdkmsClientBuilder {
    pub fn new() -> Self {
        Self {
            host: None,
            api_key: None,
            ca_cert_path: PathBuf::from(DEFAULT_CA_CERT_PATH),
            timeout: None,
            user_agent: None,
            auth_method: None,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn ca_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = path.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Replace the default API key authentication.
    pub fn auth_method(mut self, auth_method: Arc<dyn AuthMethod>) -> Self {
        self.auth_method = Some(auth_method);
        self
    }

    /// Build the client. Host and API key are not validated here; requests
    /// made without them fail at send time instead.
    pub fn build(self) -> Result<SdkmsClient, SdkmsError> {
        let mut http = reqwest::Client::builder();
        for cert in load_ca_bundle(&self.ca_cert_path) {
            http = http.add_root_certificate(cert);
        }
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        if let Some(ref user_agent) = self.user_agent {
            http = http.user_agent(user_agent.as_str());
        }
        let http = http
            .build()
            .map_err(|e| SdkmsError::Request(e.to_string()))?;

        let auth_method = self
            .auth_method
            .unwrap_or_else(|| Arc::new(ApiKeyAuth::new(self.api_key)) as Arc<dyn AuthMethod>);

        let base_url = self
            .host
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();

        Ok(SdkmsClient {
            base_url,
            http,
            token_manager: TokenManager::new(auth_method),
        })
    }
}

/// Read a PEM bundle; an unreadable or empty bundle falls back to the built-in roots.
fn load_ca_bundle(path: &Path) -> Vec<reqwest::Certificate> {
    let pem = match std::fs::read(path) {
        Ok(pem) => pem,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot read CA bundle, using built-in roots");
            return Vec::new();
        }
    };

    match reqwest::Certificate::from_pem_bundle(&pem) {
        Ok(certs) => {
            tracing::debug!(path = %path.display(), count = certs.len(), "Loaded CA bundle");
            certs
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Invalid CA bundle, using built-in roots");
            Vec::new()
        }
    }
}

/// Long-lived handle to one SDKMS endpoint.
pub struct SdkmsClient {
    base_url: String,
    http: reqwest::Client,
    token_manager: TokenManager,
}

impl SdkmsClient {
    pub fn builder() -> SdkmsClientBuilder {
        SdkmsClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base_url` with percent-encoded path segments appended.
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, SdkmsError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| SdkmsError::Request(format!("Invalid SDKMS host {:?}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| SdkmsError::Request(format!("Invalid SDKMS host {:?}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Cached token, refreshed first when missing or expired.
    pub async fn current_token(&self) -> Result<Arc<BearerToken>, SdkmsError> {
        self.token_manager.token(&self.http, &self.base_url).await
    }

    /// Fresh token straight from the auth endpoint; does not touch the cache.
    pub async fn authenticate(&self) -> Result<BearerToken, SdkmsError> {
        self.token_manager
            .authenticate(&self.http, &self.base_url)
            .await
    }

    pub async fn invalidate_token(&self) {
        self.token_manager.invalidate().await;
    }

    /// One page of the security objects visible to the app.
    pub async fn list_security_objects(
        &self,
        token: &BearerToken,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SecurityObject>, SdkmsError> {
        let url = self.endpoint(&["crypto", "v1", "keys"])?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token.value())
            .query(&[("offset", offset), ("limit", limit)])
            .send()
            .await
            .map_err(|e| SdkmsError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SdkmsError::from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| SdkmsError::InvalidResponse(e.to_string()))
    }

    /// Export a security object, including its value.
    pub async fn export_security_object(
        &self,
        token: &BearerToken,
        kid: &str,
    ) -> Result<SecurityObject, SdkmsError> {
        let url = self.endpoint(&["crypto", "v1", "keys", kid, "export"])?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token.value())
            .send()
            .await
            .map_err(|e| SdkmsError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SdkmsError::NotFound {
                kid: kid.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(SdkmsError::from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| SdkmsError::InvalidResponse(e.to_string()))
    }
}
