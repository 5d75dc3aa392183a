// src/backend.rs
use std::collections::HashSet;

use async_trait::async_trait;
use sdkms_client::{BearerToken, SdkmsClient, SdkmsError, SecurityObject};

use crate::config::BackendConfig;
use crate::connection::ConnectionDescriptor;
use crate::error::BackendError;

/// A source of connections the orchestrator can query.
///
/// `Ok(None)` means "not here, ask the next source"; errors stop the lookup.
#[async_trait]
pub trait SecretsBackend: Send + Sync {
    async fn get_connection(
        &self,
        conn_id: &str,
    ) -> Result<Option<ConnectionDescriptor>, BackendError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Resolves connections from Fortanix DSM security objects, matched by name.
pub struct FortanixBackend {
    client: SdkmsClient,
    page_size: usize,
}

impl FortanixBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        let client = config.build_client()?;
        Ok(Self::with_client(client, config.page_size))
    }

    pub fn from_env() -> Result<Self, BackendError> {
        Self::new(BackendConfig::from_env())
    }

    pub fn with_client(client: SdkmsClient, page_size: usize) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
        }
    }

    pub fn client(&self) -> &SdkmsClient {
        &self.client
    }

    /// Fetch a new token, ignoring the cached one.
    pub async fn authenticate(&self) -> Result<BearerToken, BackendError> {
        Ok(self.client.authenticate().await?)
    }

    /// Secret text stored under `conn_id`, or `None` when no such object exists.
    pub async fn resolve_secret(&self, conn_id: &str) -> Result<Option<String>, BackendError> {
        let token = self.client.current_token().await?;

        let sobject = match self.find_security_object(&token, conn_id).await? {
            Some(sobject) => sobject,
            None => {
                tracing::debug!(conn_id = %conn_id, "No security object with this name");
                return Ok(None);
            }
        };

        let exported = match self.client.export_security_object(&token, &sobject.kid).await {
            Ok(exported) => exported,
            Err(SdkmsError::NotFound { kid }) => {
                tracing::debug!(conn_id = %conn_id, kid = %kid, "Security object vanished before export");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let bytes = exported
            .value_bytes()?
            .ok_or_else(|| BackendError::MissingValue {
                conn_id: conn_id.to_string(),
            })?;

        let secret = String::from_utf8(bytes).map_err(|_| BackendError::InvalidUtf8 {
            conn_id: conn_id.to_string(),
        })?;

        tracing::debug!(conn_id = %conn_id, kid = %sobject.kid, "Resolved secret");
        Ok(Some(secret))
    }

    /// Raw secret text, for plain variables rather than connections.
    pub async fn get_variable(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.resolve_secret(key).await
    }

    /// Page through the listing until a name matches or the listing runs out.
    async fn find_security_object(
        &self,
        token: &BearerToken,
        name: &str,
    ) -> Result<Option<SecurityObject>, BackendError> {
        let mut seen = HashSet::new();
        let mut offset = 0;
        loop {
            let page = self
                .client
                .list_security_objects(token, offset, self.page_size)
                .await?;
            let page_len = page.len();
            let mut new_kids = 0;

            for sobject in page {
                if sobject.has_name(name) {
                    return Ok(Some(sobject));
                }
                if seen.insert(sobject.kid) {
                    new_kids += 1;
                }
            }

            // A short page is the last one; an oversized one means the server ignored paging.
            if page_len != self.page_size {
                return Ok(None);
            }
            // Nothing new on a full page: the server is not honouring the offset.
            if new_kids == 0 {
                tracing::warn!(offset, "SDKMS listing repeats itself, stopping");
                return Ok(None);
            }
            offset += page_len;
        }
    }
}

#[async_trait]
impl SecretsBackend for FortanixBackend {
    async fn get_connection(
        &self,
        conn_id: &str,
    ) -> Result<Option<ConnectionDescriptor>, BackendError> {
        match self.resolve_secret(conn_id).await? {
            Some(secret) => ConnectionDescriptor::from_secret(conn_id, &secret).map(Some),
            None => Ok(None),
        }
    }

    fn name(&self) -> &'static str {
        "fortanix"
    }
}
