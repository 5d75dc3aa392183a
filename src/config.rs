// src/config.rs
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use sdkms_client::{SdkmsClient, SdkmsClientBuilder, DEFAULT_CA_CERT_PATH};

use crate::error::BackendError;

pub const HOST_ENV: &str = "FORTANIX_HOST";
pub const API_KEY_ENV: &str = "FORTANIX_API_KEY";
pub const PAGE_SIZE_ENV: &str = "FORTANIX_PAGE_SIZE";

/// Security objects fetched per listing request.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Settings for [`crate::FortanixBackend`].
///
/// The backend never reads the environment itself; use [`BackendConfig::from_env`]
/// or fill the struct from any other source.
#[derive(Clone)]
pub struct BackendConfig {
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub ca_cert_path: PathBuf,
    pub page_size: usize,
    pub timeout: Option<Duration>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: None,
            api_key: None,
            ca_cert_path: PathBuf::from(DEFAULT_CA_CERT_PATH),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: None,
        }
    }
}

impl BackendConfig {
    /// Read from the actual process environment
    pub fn from_env() -> Self {
        Self::from_environ(&std::env::vars().collect())
    }

    /// Read from a custom environment (for testing)
    pub fn from_environ(environ: &HashMap<String, String>) -> Self {
        let non_empty = |name: &str| environ.get(name).filter(|v| !v.is_empty()).cloned();

        let page_size = match environ.get(PAGE_SIZE_ENV) {
            Some(raw) => match raw.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => {
                    tracing::warn!(value = %raw, "Invalid {}, using {}", PAGE_SIZE_ENV, DEFAULT_PAGE_SIZE);
                    DEFAULT_PAGE_SIZE
                }
            },
            None => DEFAULT_PAGE_SIZE,
        };

        Self {
            host: non_empty(HOST_ENV),
            api_key: non_empty(API_KEY_ENV),
            page_size,
            ..Self::default()
        }
    }

    pub(crate) fn client_builder(&self) -> SdkmsClientBuilder {
        let mut builder = SdkmsClient::builder()
            .ca_cert_path(self.ca_cert_path.clone())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(ref host) = self.host {
            builder = builder.host(host.as_str());
        } else {
            tracing::warn!("{} environment variable is not set", HOST_ENV);
        }
        if let Some(ref api_key) = self.api_key {
            builder = builder.api_key(api_key.as_str());
        } else {
            tracing::warn!("{} environment variable is not set", API_KEY_ENV);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }

    pub(crate) fn build_client(&self) -> Result<SdkmsClient, BackendError> {
        Ok(self.client_builder().build()?)
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("host", &self.host)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("ca_cert_path", &self.ca_cert_path)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .finish()
    }
}
