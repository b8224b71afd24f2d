//! Value types exchanged with the remote management service.
//!
//! Pure data — no I/O, no async. The `application::ports` traits and the
//! `infra` adapters both speak these types; `domain` never imports from
//! either layer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instance configuration: opaque option names mapped to string values.
pub type ConfigMap = BTreeMap<String, String>;

/// Device map: device name → typed attributes of that device.
pub type DeviceMap = BTreeMap<String, BTreeMap<String, String>>;

/// A resolved image alias. `target` is the image fingerprint the alias
/// points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAlias {
    pub name: String,
    pub target: String,
}

/// Image metadata as reported by an image server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    /// Content-derived unique identifier.
    pub fingerprint: String,
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A network as reported by the instance server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    /// Network kind, e.g. `bridge` or `physical`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// A storage pool as reported by the instance server. Only existence
/// matters to the provisioning workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoragePool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

/// An instance as reported by the server, with profiles and devices
/// expanded into the effective device set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Instance {
    pub name: String,
    pub expanded_devices: DeviceMap,
}

impl Instance {
    /// True if any expanded device is a network interface.
    #[must_use]
    pub fn has_nic(&self) -> bool {
        self.expanded_devices
            .values()
            .any(|device| device.get("type").is_some_and(|t| t == "nic"))
    }
}

/// Terminal payload of a successful operation.
#[derive(Debug, Clone, Default)]
pub struct OperationResult {
    /// Resource kind → identifiers touched by the operation, e.g.
    /// `instances` → `["/1.0/instances/box1"]`.
    pub resources: BTreeMap<String, Vec<String>>,
}

/// A progress update emitted by a pending operation. Transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Human-readable stage text, e.g. `"45% (2.1MB/s)"`.
    pub message: String,
    pub percent: Option<u8>,
}
