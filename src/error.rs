// src/error.rs
use sdkms_client::SdkmsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("SDKMS error: {0}")]
    Kms(#[from] SdkmsError),

    #[error("Secret for {conn_id} has no exportable value")]
    MissingValue { conn_id: String },

    #[error("Secret for {conn_id} is not valid UTF-8")]
    InvalidUtf8 { conn_id: String },

    #[error("Invalid connection {conn_id}: {reason}")]
    InvalidConnection { conn_id: String, reason: String },
}

impl BackendError {
    pub(crate) fn invalid_connection(conn_id: &str, reason: impl ToString) -> Self {
        BackendError::InvalidConnection {
            conn_id: conn_id.to_string(),
            reason: reason.to_string(),
        }
    }
}
