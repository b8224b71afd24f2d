//! HTTP implementations of the server and operation ports.
//!
//! One `reqwest::Client` is shared across every server handle; connection
//! setup is lazy, so constructing a handle performs no network I/O.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;

use crate::application::ports::{ImageServer, InstanceServer, Operation, ServerConnector};
use crate::domain::api::{
    Image, ImageAlias, Instance, Network, OperationResult, ProgressUpdate, StoragePool,
};
use crate::domain::error::RemoteError;
use crate::domain::remotes::{Protocol, Remote};
use crate::domain::request::{CreateRequest, Source};
use crate::infra::api::{
    OperationWire, STATUS_CANCELLED, STATUS_FAILURE, STATUS_SUCCESS, decode, parse_percent,
};

/// Server-side window for one long-poll of the operation wait endpoint.
const WAIT_POLL_TIMEOUT_SECS: u32 = 60;

/// Interval between progress metadata polls while an operation runs.
const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Connects to remotes over HTTPS. Production implementation of
/// `ServerConnector`.
pub struct HttpConnector {
    http: reqwest::Client,
}

impl HttpConnector {
    /// Build the shared HTTP client.
    ///
    /// No overall request timeout is set — the operation wait endpoint
    /// long-polls — only a connect timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend fails to initialize.
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("vessel/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("building HTTP client")?;
        Ok(Self { http })
    }
}

impl ServerConnector for HttpConnector {
    type Instance = HttpServer;
    type Image = HttpServer;

    async fn instance_server(&self, remote: &Remote) -> Result<HttpServer> {
        if remote.protocol != Protocol::Vessel {
            anyhow::bail!("remote {} is a read-only image server", remote.addr);
        }
        Ok(HttpServer::new(self.http.clone(), remote.clone()))
    }

    async fn image_server(&self, remote: &Remote) -> Result<HttpServer> {
        Ok(HttpServer::new(self.http.clone(), remote.clone()))
    }
}

/// A handle on one remote server.
pub struct HttpServer {
    http: reqwest::Client,
    remote: Remote,
}

impl HttpServer {
    #[must_use]
    pub fn new(http: reqwest::Client, remote: Remote) -> Self {
        Self { http, remote }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.remote.addr)
    }

    /// GET an endpoint where 404 is a meaningful "no such object".
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("querying {}", self.remote.addr))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(decode(resp).await?))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("querying {}", self.remote.addr))?;
        decode(resp).await
    }

    async fn submit(&self, req: &CreateRequest) -> Result<HttpOperation> {
        let resp = self
            .http
            .post(self.url("/1.0/instances"))
            .json(req)
            .send()
            .await
            .with_context(|| format!("submitting creation request to {}", self.remote.addr))?;
        let wire: OperationWire = decode(resp).await?;
        Ok(HttpOperation::new(
            self.http.clone(),
            self.url(&format!("/1.0/operations/{}", wire.id)),
        ))
    }
}

impl ImageServer for HttpServer {
    async fn image_alias(&self, name: &str) -> Result<Option<ImageAlias>> {
        self.get_optional(&format!("/1.0/images/aliases/{name}"))
            .await
    }

    async fn image(&self, fingerprint: &str) -> Result<Option<Image>> {
        self.get_optional(&format!("/1.0/images/{fingerprint}"))
            .await
    }
}

impl InstanceServer for HttpServer {
    type Operation = HttpOperation;

    async fn network(&self, name: &str) -> Result<Network> {
        self.get_optional(&format!("/1.0/networks/{name}"))
            .await?
            .ok_or_else(|| RemoteError::NetworkNotFound(name.to_string()).into())
    }

    async fn storage_pool(&self, name: &str) -> Result<StoragePool> {
        self.get_optional(&format!("/1.0/storage-pools/{name}"))
            .await?
            .ok_or_else(|| RemoteError::StoragePoolNotFound(name.to_string()).into())
    }

    async fn create_instance_from_image(
        &self,
        image_remote: &Remote,
        image: &Image,
        req: &CreateRequest,
    ) -> Result<HttpOperation> {
        // Complete the source descriptor the orchestrator started: fall
        // back to the fingerprint when no alias survived resolution, and
        // point the server at the image's origin when it is remote.
        let mut req = req.clone();
        if let Source::Image {
            alias,
            fingerprint,
            server,
            protocol,
        } = &mut req.source
        {
            if alias.is_none() {
                *fingerprint = Some(image.fingerprint.clone());
            }
            if image_remote.addr != self.remote.addr {
                *server = Some(image_remote.addr.clone());
                *protocol = Some(image_remote.protocol.as_str().to_string());
            }
        }
        self.submit(&req).await
    }

    async fn create_empty_instance(&self, req: &CreateRequest) -> Result<HttpOperation> {
        self.submit(req).await
    }

    async fn instance(&self, name: &str) -> Result<Instance> {
        self.get(&format!("/1.0/instances/{name}")).await
    }
}

/// Handle on one pending server-side operation.
pub struct HttpOperation {
    http: reqwest::Client,
    url: String,
    tx: mpsc::UnboundedSender<ProgressUpdate>,
    events: Option<mpsc::UnboundedReceiver<ProgressUpdate>>,
}

impl HttpOperation {
    #[must_use]
    pub fn new(http: reqwest::Client, url: String) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            http,
            url,
            tx,
            events: Some(rx),
        }
    }

    /// Long-poll the wait endpoint until the operation is terminal.
    async fn wait_done(&self) -> Result<OperationResult> {
        loop {
            let resp = self
                .http
                .get(format!("{}/wait?timeout={WAIT_POLL_TIMEOUT_SECS}", self.url))
                .send()
                .await
                .context("waiting for operation")?;
            let wire: OperationWire = decode(resp).await?;
            match wire.status_code {
                STATUS_SUCCESS => {
                    return Ok(OperationResult {
                        resources: wire.resources,
                    });
                }
                STATUS_FAILURE => {
                    if wire.err.is_empty() {
                        anyhow::bail!("operation failed");
                    }
                    anyhow::bail!("{}", wire.err);
                }
                STATUS_CANCELLED => anyhow::bail!("operation cancelled by the server"),
                // Still pending after the server's wait window; poll again.
                _ => {}
            }
        }
    }
}

impl Operation for HttpOperation {
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ProgressUpdate> {
        self.events
            .take()
            .unwrap_or_else(|| mpsc::unbounded_channel().1)
    }

    async fn wait(&mut self) -> Result<OperationResult> {
        let poller = tokio::spawn(poll_progress(
            self.http.clone(),
            self.url.clone(),
            self.tx.clone(),
        ));
        let result = self.wait_done().await;
        poller.abort();
        result
    }

    async fn cancel(&mut self) -> Result<()> {
        let resp = self
            .http
            .delete(&self.url)
            .send()
            .await
            .context("cancelling operation")?;
        resp.error_for_status().context("cancelling operation")?;
        Ok(())
    }
}

/// Poll the operation record for progress metadata and relay new stage
/// text into the event channel. Transient poll failures are skipped; the
/// task ends when the receiver is dropped or the wait aborts it.
async fn poll_progress(
    http: reqwest::Client,
    url: String,
    tx: mpsc::UnboundedSender<ProgressUpdate>,
) {
    let mut last = None;
    loop {
        tokio::time::sleep(PROGRESS_POLL_INTERVAL).await;
        let Ok(resp) = http.get(&url).send().await else {
            continue;
        };
        let Ok(wire) = decode::<OperationWire>(resp).await else {
            continue;
        };
        let Some(message) = wire.download_progress() else {
            continue;
        };
        if last.as_deref() == Some(message) {
            continue;
        }
        last = Some(message.to_string());
        let update = ProgressUpdate {
            message: message.to_string(),
            percent: parse_percent(message),
        };
        if tx.send(update).is_err() {
            return;
        }
    }
}
