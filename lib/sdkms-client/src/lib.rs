//! sdkms-client - minimal Rust client for the Fortanix DSM (SDKMS) REST API
//!
//! Covers what a secrets backend needs:
//! 1. API key → bearer token (`POST /sys/v1/session/auth`)
//! 2. List security objects (`GET /crypto/v1/keys`)
//! 3. Export a security object's value (`GET /crypto/v1/keys/{kid}/export`)

pub mod auth;
mod client;
mod error;
mod models;

pub use auth::{ApiKeyAuth, AuthMethod, BearerToken, DEFAULT_TOKEN_TTL, TokenManager};
pub use client::{DEFAULT_CA_CERT_PATH, SdkmsClient, SdkmsClientBuilder};
pub use error::SdkmsError;
pub use models::{AuthResponse, SecurityObject};
