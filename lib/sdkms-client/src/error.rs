use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkmsError {
    #[error("Security object not found: {kid}")]
    NotFound { kid: String },

    #[error("SDKMS client error ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("SDKMS request error: {0}")]
    Request(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid SDKMS response: {0}")]
    InvalidResponse(String),

    #[error("Invalid base64 value: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SdkmsError {
    /// Build a `Client` error from a non-success response, consuming its body.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        SdkmsError::Client { status, message }
    }
}
