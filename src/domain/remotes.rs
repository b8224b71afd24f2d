//! Remote endpoint configuration.
//!
//! Pure types and parsing only — loading the configuration file from disk
//! lives in `infra::remotes`. The whole config is resolved once per
//! invocation and passed around as an immutable snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::RemoteError;

/// Image name used when the user supplies an empty image token.
pub const DEFAULT_IMAGE: &str = "default";

/// Wire protocol spoken by a remote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Full management protocol: instances, networks, pools, operations.
    #[default]
    Vessel,
    /// Read-only streaming image catalog. Identifiers are content
    /// addresses, so alias and metadata lookups are skipped.
    Simplestreams,
}

impl Protocol {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Vessel => "vessel",
            Protocol::Simplestreams => "simplestreams",
        }
    }
}

/// A named remote endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Remote {
    pub addr: String,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub public: bool,
}

/// Snapshot of the remotes configuration (`~/.vessel/remotes.yaml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemotesConfig {
    pub default_remote: String,
    pub remotes: BTreeMap<String, Remote>,
}

impl Default for RemotesConfig {
    fn default() -> Self {
        let mut remotes = BTreeMap::new();
        remotes.insert(
            "local".to_string(),
            Remote {
                addr: "https://127.0.0.1:8443".to_string(),
                protocol: Protocol::Vessel,
                public: false,
            },
        );
        remotes.insert(
            "images".to_string(),
            Remote {
                addr: "https://images.vesselhub.io".to_string(),
                protocol: Protocol::Simplestreams,
                public: true,
            },
        );
        Self {
            default_remote: "local".to_string(),
            remotes,
        }
    }
}

impl RemotesConfig {
    /// Look up a remote by name.
    #[must_use]
    pub fn remote(&self, name: &str) -> Option<&Remote> {
        self.remotes.get(name)
    }

    /// True if `name` names a configured remote.
    #[must_use]
    pub fn has_remote(&self, name: &str) -> bool {
        self.remotes.contains_key(name)
    }

    /// Split a `remote:name` token into its remote and bare name.
    ///
    /// An empty token resolves to the default remote and an empty name; a
    /// token without a colon resolves to the default remote.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::UnknownRemote`] if the token is qualified
    /// with a remote that is not configured.
    pub fn parse_remote(&self, token: &str) -> Result<(String, String), RemoteError> {
        if token.is_empty() {
            return Ok((self.default_remote.clone(), String::new()));
        }
        if let Some((head, rest)) = token.split_once(':') {
            if !self.has_remote(head) {
                return Err(RemoteError::UnknownRemote(head.to_string()));
            }
            return Ok((head.to_string(), rest.to_string()));
        }
        Ok((self.default_remote.clone(), token.to_string()))
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
