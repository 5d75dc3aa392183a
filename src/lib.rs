//! Fortanix DSM secrets backend for workflow orchestrators.
//!
//! Resolves a connection id to the security object of the same name, exports
//! its value and turns it into a [`ConnectionDescriptor`]. Missing secrets are
//! `Ok(None)` so the host can fall through to its next source.

mod backend;
mod chain;
mod config;
mod connection;
mod env_backend;
mod error;

pub use backend::{FortanixBackend, SecretsBackend};
pub use chain::SecretsChain;
pub use config::{BackendConfig, API_KEY_ENV, DEFAULT_PAGE_SIZE, HOST_ENV, PAGE_SIZE_ENV};
pub use connection::{ConnectionDescriptor, ConnectionDetails, ConnectionFields};
pub use env_backend::{EnvBackend, DEFAULT_CONN_PREFIX};
pub use error::BackendError;
pub use sdkms_client::{BearerToken, SdkmsClient, SdkmsError};
