//! Application context — unified state passed to every command handler.

use anyhow::Result;

use crate::domain::remotes::RemotesConfig;
use crate::infra::client::HttpConnector;
use crate::infra::remotes::YamlRemotesStore;
use crate::output::OutputContext;

/// Unified application context passed to command handlers.
///
/// Constructed once in `Cli::run()`. The remotes configuration is loaded
/// here, once, and handed to the workflow as an immutable snapshot.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Remotes configuration snapshot.
    pub remotes: RemotesConfig,
    /// HTTP connector for remote servers.
    pub connector: HttpConnector,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the remotes configuration cannot be loaded or
    /// the HTTP client cannot be built.
    pub fn new(no_color: bool, quiet: bool) -> Result<Self> {
        Ok(Self {
            output: OutputContext::new(no_color, quiet),
            remotes: YamlRemotesStore.load()?,
            connector: HttpConnector::new()?,
        })
    }
}
