//! Shared mock infrastructure for unit tests.
//!
//! Provides canned port implementations and fixtures so each test file
//! doesn't have to re-define the same boilerplate.

#![allow(clippy::expect_used)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::mpsc;

use vessel_cli::application::ports::{
    ImageServer, InstanceServer, Operation, ProgressReporter, ProgressSink, ServerConnector,
};
use vessel_cli::domain::api::{
    Image, ImageAlias, Instance, Network, OperationResult, ProgressUpdate, StoragePool,
};
use vessel_cli::domain::remotes::{Protocol, Remote, RemotesConfig};
use vessel_cli::domain::request::CreateRequest;

// ── Remotes fixture ───────────────────────────────────────────────────────────

/// Remotes used across the service tests:
/// - `local` — default, management protocol
/// - `images` — management protocol image remote
/// - `streams` — streaming-catalog protocol
/// - `ubuntu` — management protocol, exists to collide with image tokens
pub fn remotes_fixture() -> RemotesConfig {
    let mut remotes = BTreeMap::new();
    for (name, protocol) in [
        ("local", Protocol::Vessel),
        ("images", Protocol::Vessel),
        ("ubuntu", Protocol::Vessel),
        ("streams", Protocol::Simplestreams),
    ] {
        remotes.insert(
            name.to_string(),
            Remote {
                addr: format!("https://{name}.test"),
                protocol,
                public: false,
            },
        );
    }
    RemotesConfig {
        default_remote: "local".to_string(),
        remotes,
    }
}

// ── Server fixture and mock ───────────────────────────────────────────────────

/// Canned server-side state backing a [`MockServer`].
#[derive(Default)]
pub struct Fixture {
    /// alias name → target fingerprint
    pub aliases: BTreeMap<String, String>,
    /// fingerprint → image metadata
    pub images: BTreeMap<String, Image>,
    pub networks: BTreeMap<String, Network>,
    pub pools: Vec<String>,
    pub instances: BTreeMap<String, Instance>,
    /// Name the server assigns when the request leaves it empty.
    pub assigned_name: String,
}

impl Fixture {
    pub fn with_alias(mut self, alias: &str, fingerprint: &str) -> Self {
        self.aliases
            .insert(alias.to_string(), fingerprint.to_string());
        self.images.entry(fingerprint.to_string()).or_insert(Image {
            fingerprint: fingerprint.to_string(),
            ..Image::default()
        });
        self
    }

    pub fn with_image(mut self, fingerprint: &str) -> Self {
        self.images.insert(
            fingerprint.to_string(),
            Image {
                fingerprint: fingerprint.to_string(),
                ..Image::default()
            },
        );
        self
    }

    pub fn with_network(mut self, name: &str, kind: &str) -> Self {
        self.networks.insert(
            name.to_string(),
            Network {
                name: name.to_string(),
                kind: kind.to_string(),
            },
        );
        self
    }

    pub fn with_pool(mut self, name: &str) -> Self {
        self.pools.push(name.to_string());
        self
    }

    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instances.insert(instance.name.clone(), instance);
        self
    }
}

/// One recorded creation submission.
#[derive(Clone)]
pub struct Submission {
    pub req: CreateRequest,
    pub image: Option<Image>,
    pub image_remote_addr: Option<String>,
}

/// In-memory implementation of the server ports, recording every call.
#[derive(Clone)]
pub struct MockServer {
    fixture: Arc<Fixture>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub submissions: Arc<Mutex<Vec<Submission>>>,
}

impl MockServer {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture: Arc::new(fixture),
            calls: Arc::new(Mutex::new(Vec::new())),
            submissions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn log(&self, call: String) {
        self.calls.lock().expect("mutex poisoned").push(call);
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().expect("mutex poisoned").clone()
    }

    pub fn recorded_submissions(&self) -> Vec<Submission> {
        self.submissions.lock().expect("mutex poisoned").clone()
    }

    fn operation_for(&self, req: &CreateRequest) -> MockOperation {
        let name = if req.name.is_empty() {
            self.fixture.assigned_name.clone()
        } else {
            req.name.clone()
        };
        let mut resources = BTreeMap::new();
        resources.insert(
            "instances".to_string(),
            vec![format!("/1.0/instances/{name}")],
        );
        MockOperation::succeeding(vec![], OperationResult { resources })
    }
}

impl ImageServer for MockServer {
    async fn image_alias(&self, name: &str) -> Result<Option<ImageAlias>> {
        self.log(format!("image_alias:{name}"));
        Ok(self.fixture.aliases.get(name).map(|target| ImageAlias {
            name: name.to_string(),
            target: target.clone(),
        }))
    }

    async fn image(&self, fingerprint: &str) -> Result<Option<Image>> {
        self.log(format!("image:{fingerprint}"));
        Ok(self.fixture.images.get(fingerprint).cloned())
    }
}

impl InstanceServer for MockServer {
    type Operation = MockOperation;

    async fn network(&self, name: &str) -> Result<Network> {
        self.log(format!("network:{name}"));
        self.fixture
            .networks
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Network not found: {name}"))
    }

    async fn storage_pool(&self, name: &str) -> Result<StoragePool> {
        self.log(format!("storage_pool:{name}"));
        if self.fixture.pools.iter().any(|p| p == name) {
            Ok(StoragePool {
                name: name.to_string(),
                driver: None,
            })
        } else {
            Err(anyhow::anyhow!("Storage pool not found: {name}"))
        }
    }

    async fn create_instance_from_image(
        &self,
        image_remote: &Remote,
        image: &Image,
        req: &CreateRequest,
    ) -> Result<MockOperation> {
        self.log(format!("create_from_image:{}", image.fingerprint));
        self.submissions.lock().expect("mutex poisoned").push(Submission {
            req: req.clone(),
            image: Some(image.clone()),
            image_remote_addr: Some(image_remote.addr.clone()),
        });
        Ok(self.operation_for(req))
    }

    async fn create_empty_instance(&self, req: &CreateRequest) -> Result<MockOperation> {
        self.log("create_empty".to_string());
        self.submissions.lock().expect("mutex poisoned").push(Submission {
            req: req.clone(),
            image: None,
            image_remote_addr: None,
        });
        Ok(self.operation_for(req))
    }

    async fn instance(&self, name: &str) -> Result<Instance> {
        self.log(format!("instance:{name}"));
        self.fixture
            .instances
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("not found: {name}"))
    }
}

// ── Mock connector ────────────────────────────────────────────────────────────

/// Hands out [`MockServer`] clones, recording which remotes were
/// connected. A per-address image server can be registered; otherwise the
/// main server doubles as the image server.
pub struct MockConnector {
    pub server: MockServer,
    pub image_servers: BTreeMap<String, MockServer>,
    pub connects: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    pub fn new(server: MockServer) -> Self {
        Self {
            server,
            image_servers: BTreeMap::new(),
            connects: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_image_server(mut self, addr: &str, server: MockServer) -> Self {
        self.image_servers.insert(addr.to_string(), server);
        self
    }

    pub fn recorded_connects(&self) -> Vec<String> {
        self.connects.lock().expect("mutex poisoned").clone()
    }
}

impl ServerConnector for MockConnector {
    type Instance = MockServer;
    type Image = MockServer;

    async fn instance_server(&self, remote: &Remote) -> Result<MockServer> {
        self.connects
            .lock()
            .expect("mutex poisoned")
            .push(format!("instance:{}", remote.addr));
        Ok(self.server.clone())
    }

    async fn image_server(&self, remote: &Remote) -> Result<MockServer> {
        self.connects
            .lock()
            .expect("mutex poisoned")
            .push(format!("image:{}", remote.addr));
        Ok(self
            .image_servers
            .get(&remote.addr)
            .cloned()
            .unwrap_or_else(|| self.server.clone()))
    }
}

// ── Mock operation ────────────────────────────────────────────────────────────

/// Scripted operation: optionally emits canned progress events, then
/// completes, fails, or never finishes.
pub struct MockOperation {
    events: Vec<ProgressUpdate>,
    outcome: Option<Result<OperationResult>>,
    completes: bool,
    pub cancel_calls: Arc<Mutex<u32>>,
}

impl MockOperation {
    pub fn succeeding(events: Vec<ProgressUpdate>, result: OperationResult) -> Self {
        Self {
            events,
            outcome: Some(Ok(result)),
            completes: true,
            cancel_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn failing(events: Vec<ProgressUpdate>, message: &str) -> Self {
        Self {
            events,
            outcome: Some(Err(anyhow::anyhow!("{message}"))),
            completes: true,
            cancel_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn never_completing() -> Self {
        Self {
            events: Vec::new(),
            outcome: None,
            completes: false,
            cancel_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn cancel_count(&self) -> u32 {
        *self.cancel_calls.lock().expect("mutex poisoned")
    }
}

impl Operation for MockOperation {
    fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ProgressUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        for event in self.events.drain(..) {
            let _ = tx.send(event);
        }
        rx
    }

    async fn wait(&mut self) -> Result<OperationResult> {
        if !self.completes {
            return std::future::pending().await;
        }
        self.outcome
            .take()
            .unwrap_or_else(|| Err(anyhow::anyhow!("wait called twice")))
    }

    async fn cancel(&mut self) -> Result<()> {
        *self.cancel_calls.lock().expect("mutex poisoned") += 1;
        Ok(())
    }
}

// ── Recording reporter and sink ───────────────────────────────────────────────

/// `ProgressReporter` that records every message with its level.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    pub messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingReporter {
    pub fn recorded(&self) -> Vec<String> {
        self.messages.lock().expect("mutex poisoned").clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.recorded()
            .into_iter()
            .filter(|m| m.starts_with("warn:"))
            .collect()
    }

    fn record(&self, level: &str, message: &str) {
        self.messages
            .lock()
            .expect("mutex poisoned")
            .push(format!("{level}:{message}"));
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.record("step", message);
    }

    fn success(&self, message: &str) {
        self.record("success", message);
    }

    fn warn(&self, message: &str) {
        self.record("warn", message);
    }
}

/// `ProgressSink` that records updates and finalizations in arrival order.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub entries: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn recorded(&self) -> Vec<String> {
        self.entries.lock().expect("mutex poisoned").clone()
    }
}

impl ProgressSink for RecordingSink {
    fn update(&self, update: &ProgressUpdate) {
        self.entries
            .lock()
            .expect("mutex poisoned")
            .push(format!("update:{}", update.message));
    }

    fn done(&self) {
        self.entries
            .lock()
            .expect("mutex poisoned")
            .push("done".to_string());
    }
}

/// An interrupt source that never fires.
pub fn no_interrupt() -> std::future::Pending<()> {
    std::future::pending()
}
