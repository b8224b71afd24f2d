//! `vessel init` — create an instance from an image without starting it.

use std::io::{IsTerminal, Read};

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::provision::{self as service, ProvisionOptions};
use crate::domain::request::SpecOverlay;
use crate::output::progress::OperationProgress;
use crate::output::reporter::TerminalReporter;

/// Arguments for the init command.
#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Image to create the instance from: [<remote>:]<image>
    pub image: Option<String>,

    /// Instance name: [<remote>:][<name>]
    pub name: Option<String>,

    /// Config key/value to apply to the new instance
    #[arg(short, long = "config", value_name = "KEY=VALUE")]
    pub config: Vec<String>,

    /// Profile to apply to the new instance
    #[arg(short, long = "profile", value_name = "PROFILE")]
    pub profile: Vec<String>,

    /// Ephemeral instance (destroyed on stop)
    #[arg(short, long)]
    pub ephemeral: bool,

    /// Network name
    #[arg(short, long, value_name = "NETWORK")]
    pub network: Option<String>,

    /// Storage pool name
    #[arg(short, long, value_name = "POOL")]
    pub storage: Option<String>,

    /// Instance type
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub instance_type: Option<String>,

    /// Create the instance with no profiles applied
    #[arg(long)]
    pub no_profiles: bool,

    /// Create an empty instance
    #[arg(long)]
    pub empty: bool,
}

/// Run `vessel init`.
///
/// # Errors
///
/// Returns an error if input parsing, image resolution, or the creation
/// operation fails.
pub async fn run(args: &InitArgs, app: &AppContext) -> Result<()> {
    let overlay = read_stdin_overlay()?;

    let opts = ProvisionOptions {
        image: args.image.clone(),
        name: args.name.clone(),
        config: args.config.clone(),
        profiles: args.profile.clone(),
        no_profiles: args.no_profiles,
        network: args.network.clone(),
        storage: args.storage.clone(),
        instance_type: args.instance_type.clone().unwrap_or_default(),
        ephemeral: args.ephemeral,
        empty: args.empty,
    };

    let reporter = TerminalReporter::new(&app.output);
    let sink = OperationProgress::new(app.output.show_progress());
    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let created = service::provision_instance(
        &app.remotes,
        &app.connector,
        &reporter,
        &sink,
        overlay,
        &opts,
        interrupt,
    )
    .await?;

    app.output.success(&format!("Created {}", created.name));
    Ok(())
}

/// Read the piped instance specification, if any. An interactive stdin
/// means no overlay — no blocking read is attempted.
fn read_stdin_overlay() -> Result<SpecOverlay> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(SpecOverlay::default());
    }
    let mut contents = String::new();
    stdin
        .lock()
        .read_to_string(&mut contents)
        .context("reading instance specification from stdin")?;
    SpecOverlay::parse(&contents)
}
