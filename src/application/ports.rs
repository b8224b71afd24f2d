//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::api::{
    Image, ImageAlias, Instance, Network, OperationResult, ProgressUpdate, StoragePool,
};
use crate::domain::remotes::Remote;
use crate::domain::request::CreateRequest;

// ── Server Port Traits ────────────────────────────────────────────────────────

/// Read-only image lookups. Implemented by both full instance servers and
/// image-only catalog servers.
#[allow(async_fn_in_trait)]
pub trait ImageServer {
    /// Resolve an alias to its target fingerprint. `None` if no such alias.
    async fn image_alias(&self, name: &str) -> Result<Option<ImageAlias>>;
    /// Fetch image metadata by fingerprint. `None` if no such image.
    async fn image(&self, fingerprint: &str) -> Result<Option<Image>>;
}

/// Full management surface of a target server.
#[allow(async_fn_in_trait)]
pub trait InstanceServer: ImageServer {
    type Operation: Operation;

    /// Look up a network by name. Missing networks are an error carrying
    /// the unresolved identifier.
    async fn network(&self, name: &str) -> Result<Network>;
    /// Look up a storage pool by name. Missing pools are an error carrying
    /// the unresolved identifier.
    async fn storage_pool(&self, name: &str) -> Result<StoragePool>;
    /// Submit a creation request sourced from `image` on `image_remote`.
    async fn create_instance_from_image(
        &self,
        image_remote: &Remote,
        image: &Image,
        req: &CreateRequest,
    ) -> Result<Self::Operation>;
    /// Submit an empty-instance creation request (source type `none`).
    async fn create_empty_instance(&self, req: &CreateRequest) -> Result<Self::Operation>;
    /// Fetch an instance with its expanded device set.
    async fn instance(&self, name: &str) -> Result<Instance>;
}

// ── Operation Port ────────────────────────────────────────────────────────────

/// Client-side handle on a server-side asynchronous operation.
///
/// The handle is terminal once `wait` returns; callers never retain it
/// afterwards.
#[allow(async_fn_in_trait)]
pub trait Operation {
    /// Take the progress event stream. Must be taken before `wait` begins
    /// so no early events are lost; a second call yields an empty stream.
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ProgressUpdate>;
    /// Block until the operation reaches a terminal state and return its
    /// result payload, or the server-side failure.
    async fn wait(&mut self) -> Result<OperationResult>;
    /// Best-effort cancellation request. The caller does not wait for the
    /// server to confirm.
    async fn cancel(&mut self) -> Result<()>;
}

// ── Connector Port ────────────────────────────────────────────────────────────

/// Connects to remotes on demand. Passed explicitly into the workflow so
/// there is no ambient global configuration.
#[allow(async_fn_in_trait)]
pub trait ServerConnector {
    type Instance: InstanceServer;
    type Image: ImageServer;

    /// Connect to a remote speaking the full management protocol.
    async fn instance_server(&self, remote: &Remote) -> Result<Self::Instance>;
    /// Connect to a remote for image lookups only.
    async fn image_server(&self, remote: &Remote) -> Result<Self::Image>;
}

// ── Progress Reporting Ports ──────────────────────────────────────────────────

/// Abstracts status reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit an advisory on the error channel.
    fn warn(&self, message: &str);
}

/// Renders operation progress as a single overwritten status line.
pub trait ProgressSink {
    /// Render one progress update.
    fn update(&self, update: &ProgressUpdate);
    /// Finalize the progress line. Called on every exit path of the
    /// tracked wait, success or not.
    fn done(&self);
}
