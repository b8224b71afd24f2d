//! Instance creation request assembly.
//!
//! Pure functions only — the orchestrator performs the remote lookups and
//! feeds their results in here. Each merge function takes its base by
//! value and returns the merged map, so call sites cannot depend on hidden
//! mutation order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::api::{ConfigMap, DeviceMap, Network};
use crate::domain::error::RequestError;

/// Overlay read from piped standard input: a partial instance
/// specification in YAML form. Unknown top-level keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpecOverlay {
    pub config: ConfigMap,
    pub devices: DeviceMap,
    /// `None` when the document has no `profiles` key; an empty list is
    /// carried through and later treated as "defer to the server default".
    pub profiles: Option<Vec<String>>,
    pub ephemeral: bool,
}

impl SpecOverlay {
    /// Parse a piped specification document. Whitespace-only input is an
    /// empty overlay.
    ///
    /// # Errors
    ///
    /// Returns a fatal parse error for malformed YAML.
    pub fn parse(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).context("parsing instance specification from stdin")
    }
}

/// Source descriptor of a creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    Image {
        /// Original alias string as the user supplied it, preserved for
        /// display and recording even after resolution to a fingerprint.
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fingerprint: Option<String>,
        /// Address of the image server, when it differs from the target.
        #[serde(skip_serializing_if = "Option::is_none")]
        server: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        protocol: Option<String>,
    },
    /// Empty instance — no image source.
    None,
}

/// The immutable creation request submitted to the instance server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRequest {
    /// May be empty — the server then assigns a name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance_type: String,
    pub config: ConfigMap,
    pub devices: DeviceMap,
    /// `None` defers to the server default; `Some(vec![])` explicitly
    /// requests no profiles. The two serialize differently.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<String>>,
    pub ephemeral: bool,
    pub source: Source,
}

/// Merge `key=value` flag entries over the base config, last writer wins.
///
/// # Errors
///
/// Returns [`RequestError::BadKeyValue`] for an entry without `=`.
pub fn merge_config(base: ConfigMap, entries: &[String]) -> Result<ConfigMap, RequestError> {
    let mut config = base;
    for entry in entries {
        let Some((key, value)) = entry.split_once('=') else {
            return Err(RequestError::BadKeyValue(entry.clone()));
        };
        config.insert(key.to_string(), value.to_string());
    }
    Ok(config)
}

/// Insert a nic device for the requested network, keyed by the network
/// name. Bridges get a `bridged` nic, anything else `macvlan`. Overwrites
/// any overlay device of the same name.
#[must_use]
pub fn with_network_device(mut devices: DeviceMap, network: &Network) -> DeviceMap {
    let nictype = if network.kind == "bridge" {
        "bridged"
    } else {
        "macvlan"
    };
    devices.insert(
        network.name.clone(),
        [
            ("type".to_string(), "nic".to_string()),
            ("nictype".to_string(), nictype.to_string()),
            ("parent".to_string(), network.name.clone()),
        ]
        .into_iter()
        .collect(),
    );
    devices
}

/// Force-set the root disk onto the requested pool, overriding any prior
/// `root` entry. Once set, later merges never drop it.
#[must_use]
pub fn with_root_disk(mut devices: DeviceMap, pool: &str) -> DeviceMap {
    devices.insert(
        "root".to_string(),
        [
            ("type".to_string(), "disk".to_string()),
            ("path".to_string(), "/".to_string()),
            ("pool".to_string(), pool.to_string()),
        ]
        .into_iter()
        .collect(),
    );
    devices
}

/// Decide the request's profile list.
///
/// Suppression or any explicit `-p` flag wins and yields the flag list
/// verbatim (possibly empty, meaning "no profiles"). Otherwise non-empty
/// overlay profiles are carried through; an absent or empty overlay list
/// defers to the server default (`None`).
#[must_use]
pub fn resolve_profiles(
    no_profiles: bool,
    flags: &[String],
    overlay: Option<Vec<String>>,
) -> Option<Vec<String>> {
    if no_profiles || !flags.is_empty() {
        return Some(flags.to_vec());
    }
    overlay.filter(|profiles| !profiles.is_empty())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
