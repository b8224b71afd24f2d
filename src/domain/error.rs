//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to
//! `anyhow::Error` via the `?` operator.

use thiserror::Error;

// ── Input errors ──────────────────────────────────────────────────────────────

/// Errors in user-supplied input, detected before any remote call.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Bad key=value pair: {0}")]
    BadKeyValue(String),

    #[error("--empty cannot be combined with an image name")]
    EmptyWithImage,

    #[error("An image argument is required unless --empty is given")]
    MissingImage,
}

// ── Resolution errors ─────────────────────────────────────────────────────────

/// Errors resolving names against configuration or the remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Unknown remote: {0}")]
    UnknownRemote(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Network not found: {0}")]
    NetworkNotFound(String),

    #[error("Storage pool not found: {0}")]
    StoragePoolNotFound(String),
}

// ── Workflow errors ───────────────────────────────────────────────────────────

/// Errors in the provisioning workflow itself.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("The server did not report any created instance")]
    NoInstanceReported,

    #[error("Operation cancelled")]
    Cancelled,
}
