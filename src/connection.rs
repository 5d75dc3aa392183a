// src/connection.rs
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::BackendError;

const MASK: &str = "***";

/// A connection resolved from a secret.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionDescriptor {
    pub conn_id: String,
    #[serde(flatten)]
    pub details: ConnectionDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionDetails {
    Uri(String),
    Fields(ConnectionFields),
}

/// Serialized connection record, as the orchestrator stores it in JSON form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conn_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_port",
        skip_serializing_if = "Option::is_none"
    )]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl ConnectionFields {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Deserialize)]
struct ConnectionRecord {
    #[serde(default)]
    uri: Option<String>,
    #[serde(flatten)]
    fields: ConnectionFields,
}

/// Ports show up both as numbers and as strings in stored records.
fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid port: {}", n))),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid port: {}", s))),
        Some(other) => Err(de::Error::custom(format!("invalid port: {}", other))),
    }
}

impl ConnectionDescriptor {
    /// Interpret a secret value.
    ///
    /// A value starting with `{` is a JSON connection record (which may itself
    /// carry a single `uri` field); anything else is a connection URI.
    pub fn from_secret(conn_id: &str, value: &str) -> Result<Self, BackendError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(BackendError::invalid_connection(conn_id, "empty secret value"));
        }

        let details = if value.starts_with('{') {
            let record: ConnectionRecord = serde_json::from_str(value)
                .map_err(|e| BackendError::invalid_connection(conn_id, e))?;
            match record.uri {
                Some(uri) if record.fields.is_empty() => ConnectionDetails::Uri(uri),
                Some(_) => {
                    return Err(BackendError::invalid_connection(
                        conn_id,
                        "uri cannot be combined with other connection fields",
                    ))
                }
                None => ConnectionDetails::Fields(record.fields),
            }
        } else {
            ConnectionDetails::Uri(value.to_string())
        };

        Ok(Self {
            conn_id: conn_id.to_string(),
            details,
        })
    }

    pub fn uri(&self) -> Option<&str> {
        match &self.details {
            ConnectionDetails::Uri(uri) => Some(uri),
            ConnectionDetails::Fields(_) => None,
        }
    }

    /// Structured view of the connection; URIs are parsed.
    pub fn fields(&self) -> Result<ConnectionFields, BackendError> {
        match &self.details {
            ConnectionDetails::Fields(fields) => Ok(fields.clone()),
            ConnectionDetails::Uri(uri) => parse_uri(&self.conn_id, uri),
        }
    }

    /// Copy with passwords masked, for display.
    pub fn redacted(&self) -> Self {
        let details = match &self.details {
            ConnectionDetails::Uri(uri) => ConnectionDetails::Uri(mask_uri_password(uri)),
            ConnectionDetails::Fields(fields) => ConnectionDetails::Fields(ConnectionFields {
                password: fields.password.as_ref().map(|_| MASK.to_string()),
                ..fields.clone()
            }),
        };
        Self {
            conn_id: self.conn_id.clone(),
            details,
        }
    }
}

fn mask_uri_password(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some(MASK));
            }
            url.to_string()
        }
        Err(_) => MASK.to_string(),
    }
}

fn decode(conn_id: &str, raw: &str) -> Result<Option<String>, BackendError> {
    if raw.is_empty() {
        return Ok(None);
    }
    urlencoding::decode(raw)
        .map(|s| Some(s.into_owned()))
        .map_err(|e| BackendError::invalid_connection(conn_id, e))
}

fn parse_uri(conn_id: &str, uri: &str) -> Result<ConnectionFields, BackendError> {
    let url = Url::parse(uri).map_err(|e| BackendError::invalid_connection(conn_id, e))?;

    let conn_type = match url.scheme().replace('-', "_").as_str() {
        "postgresql" => "postgres".to_string(),
        other => other.to_string(),
    };

    let extra = match url.query() {
        None | Some("") => None,
        Some(_) => {
            let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
            if pairs.len() == 1 && pairs[0].0 == "__extra__" {
                let (_, raw) = pairs.remove(0);
                Some(
                    serde_json::from_str(&raw)
                        .map_err(|e| BackendError::invalid_connection(conn_id, e))?,
                )
            } else {
                Some(serde_json::Value::Object(
                    pairs
                        .into_iter()
                        .map(|(k, v)| (k, serde_json::Value::String(v)))
                        .collect(),
                ))
            }
        }
    };

    Ok(ConnectionFields {
        conn_type: Some(conn_type),
        description: None,
        host: decode(conn_id, url.host_str().unwrap_or_default())?,
        login: decode(conn_id, url.username())?,
        password: decode(conn_id, url.password().unwrap_or_default())?,
        schema: decode(conn_id, url.path().trim_start_matches('/'))?,
        port: url.port(),
        extra,
    })
}
