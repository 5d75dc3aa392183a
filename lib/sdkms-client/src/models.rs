use crate::error::SdkmsError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Response of `POST /sys/v1/session/auth`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
}

/// A security object as returned by the listing and export endpoints.
///
/// `value` is only populated by export and is base64 on the wire.
#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityObject {
    pub kid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub obj_type: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl SecurityObject {
    /// Decode the exported value, if any.
    pub fn value_bytes(&self) -> Result<Option<Vec<u8>>, SdkmsError> {
        match &self.value {
            Some(encoded) => Ok(Some(STANDARD.decode(encoded.trim())?)),
            None => Ok(None),
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

impl std::fmt::Debug for SecurityObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityObject")
            .field("kid", &self.kid)
            .field("name", &self.name)
            .field("obj_type", &self.obj_type)
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_deserialize() {
        let json = r#"{
            "token_type": "Bearer",
            "expires_in": 600,
            "access_token": "abc",
            "entity_id": "3e9bd0e7-1b0c-4c3c-8a33-0a5d3a7f7a44"
        }"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "abc");
        assert_eq!(resp.expires_in, Some(600));
    }

    #[test]
    fn test_auth_response_without_lifetime() {
        let resp: AuthResponse = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert!(resp.expires_in.is_none());
    }

    #[test]
    fn test_security_object_value_decoding() {
        let json = r#"{"kid": "k1", "name": "conn_a", "obj_type": "SECRET", "value": "aGVsbG8="}"#;
        let sobject: SecurityObject = serde_json::from_str(json).unwrap();
        assert!(sobject.has_name("conn_a"));
        assert_eq!(sobject.value_bytes().unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn test_security_object_listing_has_no_value() {
        let sobject: SecurityObject = serde_json::from_str(r#"{"kid": "k1"}"#).unwrap();
        assert!(!sobject.has_name("conn_a"));
        assert_eq!(sobject.value_bytes().unwrap(), None);
    }

    #[test]
    fn test_security_object_invalid_base64() {
        let sobject: SecurityObject =
            serde_json::from_str(r#"{"kid": "k1", "value": "not base64!"}"#).unwrap();
        assert!(matches!(sobject.value_bytes(), Err(SdkmsError::Decode(_))));
    }

    #[test]
    fn test_security_object_debug_redacts_value() {
        let sobject: SecurityObject =
            serde_json::from_str(r#"{"kid": "k1", "value": "aGVsbG8="}"#).unwrap();
        let debug = format!("{:?}", sobject);
        assert!(!debug.contains("aGVsbG8="));
        assert!(debug.contains("<redacted>"));
    }
}
