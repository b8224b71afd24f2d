//! Loads the remotes configuration from disk.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::remotes::RemotesConfig;

/// Reads `~/.vessel/remotes.yaml`. A missing file yields the built-in
/// defaults; a malformed one is fatal.
pub struct YamlRemotesStore;

impl YamlRemotesStore {
    /// Load the remotes configuration snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed,
    /// or if the home directory cannot be determined.
    pub fn load(&self) -> Result<RemotesConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(RemotesConfig::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        serde_yaml::from_str(&contents).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Resolve the configuration file path. `VESSEL_REMOTES` overrides the
    /// default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var("VESSEL_REMOTES") {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".vessel").join("remotes.yaml"))
    }
}
