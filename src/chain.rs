// src/chain.rs
use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::SecretsBackend;
use crate::connection::ConnectionDescriptor;
use crate::error::BackendError;

/// Ordered list of backends: the first one that knows the connection wins.
///
/// `None` falls through to the next backend; an error ends the lookup.
#[derive(Default)]
pub struct SecretsChain {
    backends: Vec<Arc<dyn SecretsBackend>>,
}

impl SecretsChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: Arc<dyn SecretsBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

#[async_trait]
impl SecretsBackend for SecretsChain {
    async fn get_connection(
        &self,
        conn_id: &str,
    ) -> Result<Option<ConnectionDescriptor>, BackendError> {
        for backend in &self.backends {
            match backend.get_connection(conn_id).await {
                Ok(Some(conn)) => {
                    tracing::debug!(conn_id = %conn_id, backend = backend.name(), "Connection found");
                    return Ok(Some(conn));
                }
                Ok(None) => {
                    tracing::debug!(conn_id = %conn_id, backend = backend.name(), "Connection not found, trying next backend");
                }
                Err(e) => {
                    tracing::warn!(conn_id = %conn_id, backend = backend.name(), error = %e, "Backend lookup failed");
                    return Err(e);
                }
            }
        }
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}
