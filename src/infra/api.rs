//! Wire types for the management REST API.
//!
//! Every endpoint wraps its payload in a response envelope; asynchronous
//! endpoints return an operation record instead of a direct payload.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Operation status codes used by the management protocol.
pub const STATUS_RUNNING: u16 = 103;
pub const STATUS_SUCCESS: u16 = 200;
pub const STATUS_FAILURE: u16 = 400;
pub const STATUS_CANCELLED: u16 = 401;

/// Response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_code: u16,
    pub metadata: Option<T>,
}

/// A server-side operation record.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationWire {
    pub id: String,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub err: String,
    #[serde(default)]
    pub resources: BTreeMap<String, Vec<String>>,
    /// Free-form progress metadata while running, e.g.
    /// `{"download_progress": "45% (2.1MB/s)"}`.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl OperationWire {
    /// The `download_progress` stage text, if present.
    #[must_use]
    pub fn download_progress(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("download_progress"))
            .and_then(serde_json::Value::as_str)
    }
}

/// Decode a response envelope, surfacing HTTP and in-band errors with the
/// server's own message.
///
/// # Errors
///
/// Returns an error for non-success HTTP status, an `error`-typed
/// envelope, an undecodable body, or a missing payload.
pub async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let body: ApiResponse<T> = resp.json().await.context("decoding server response")?;
    if body.kind == "error" || !status.is_success() {
        if body.error.is_empty() {
            anyhow::bail!("server returned {status}");
        }
        anyhow::bail!("{} ({})", body.error, body.error_code);
    }
    body.metadata
        .ok_or_else(|| anyhow::anyhow!("server response has no payload"))
}

/// Extract the leading percentage from a progress stage text such as
/// `"45% (2.1MB/s)"`.
#[must_use]
pub fn parse_percent(message: &str) -> Option<u8> {
    let digits: String = message.chars().take_while(char::is_ascii_digit).collect();
    if message[digits.len()..].starts_with('%') {
        digits.parse().ok()
    } else {
        None
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
