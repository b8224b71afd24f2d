//! Application service — instance provisioning use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::Result;

use crate::application::ports::{InstanceServer, ProgressReporter, ProgressSink, ServerConnector};
use crate::application::services::image::{
    guess_image, resolve_image_source, simplestreams_image,
};
use crate::application::services::tracker::track_operation;
use crate::domain::error::{ProvisionError, RemoteError, RequestError};
use crate::domain::remotes::{DEFAULT_IMAGE, Protocol, RemotesConfig};
use crate::domain::request::{
    CreateRequest, SpecOverlay, Source, merge_config, resolve_profiles, with_network_device,
    with_root_disk,
};

/// Flags and positional arguments of a provisioning invocation.
#[derive(Debug, Clone, Default)]
pub struct ProvisionOptions {
    /// First positional argument: `[<remote>:]<image>`.
    pub image: Option<String>,
    /// Second positional argument: `[<remote>:][<name>]`.
    pub name: Option<String>,
    pub config: Vec<String>,
    pub profiles: Vec<String>,
    pub no_profiles: bool,
    pub network: Option<String>,
    pub storage: Option<String>,
    pub instance_type: String,
    pub ephemeral: bool,
    pub empty: bool,
}

/// Outcome of a successful provisioning run.
#[derive(Debug)]
pub struct Provisioned {
    pub remote: String,
    pub name: String,
}

/// Provision one instance: resolve remotes and image, build the creation
/// request, submit it, and track the server-side operation to completion.
///
/// Any step's fatal error aborts the remaining steps unchanged — creation
/// is atomic at the server, so there is no partial rollback. No remote
/// call is retried.
///
/// # Errors
///
/// Returns input errors before any remote call, resolution errors with the
/// unresolved identifier, transport errors unchanged, or the operation's
/// own failure after the tracked wait.
#[allow(clippy::too_many_lines)]
pub async fn provision_instance<C: ServerConnector>(
    remotes: &RemotesConfig,
    connector: &C,
    reporter: &impl ProgressReporter,
    sink: &impl ProgressSink,
    overlay: SpecOverlay,
    opts: &ProvisionOptions,
    interrupt: impl Future<Output = ()>,
) -> Result<Provisioned> {
    // Positional parsing: first argument is the image token, second the
    // instance name, either one optionally remote-qualified.
    let (image_remote, mut image) = match &opts.image {
        Some(token) => remotes.parse_remote(token)?,
        None => (remotes.default_remote.clone(), String::new()),
    };
    let (mut remote, mut name) = match &opts.name {
        Some(token) => remotes.parse_remote(token)?,
        None => remotes.parse_remote("")?,
    };

    if opts.empty {
        if opts.name.is_some() {
            return Err(RequestError::EmptyWithImage.into());
        }
        if opts.image.is_some() {
            // A single argument in empty mode names the instance.
            name = std::mem::take(&mut image);
            remote = image_remote.clone();
        }
    } else if opts.image.is_none() {
        return Err(RequestError::MissingImage.into());
    }

    // Flag-sourced config is validated before any remote call.
    let config = merge_config(overlay.config, &opts.config)?;

    let remote_cfg = remotes
        .remote(&remote)
        .ok_or_else(|| RemoteError::UnknownRemote(remote.clone()))?;
    let server = connector.instance_server(remote_cfg).await?;

    if name.is_empty() {
        reporter.step("Creating the instance");
    } else {
        reporter.step(&format!("Creating {name}"));
    }

    let mut devices = overlay.devices;
    if let Some(network_name) = &opts.network {
        let network = server.network(network_name).await?;
        devices = with_network_device(devices, &network);
    }
    if let Some(pool) = &opts.storage {
        server.storage_pool(pool).await?;
        devices = with_root_disk(devices, pool);
    }

    let mut req = CreateRequest {
        name: name.clone(),
        instance_type: opts.instance_type.clone(),
        config,
        devices,
        profiles: resolve_profiles(opts.no_profiles, &opts.profiles, overlay.profiles),
        ephemeral: opts.ephemeral,
        source: Source::None,
    };

    let result = if opts.empty {
        let mut op = server.create_empty_instance(&req).await?;
        track_operation(&mut op, sink, interrupt).await?
    } else {
        let (image_remote, image_token) =
            guess_image(remotes, &server, &remote, &image_remote, &image, reporter).await;
        let image_token = if image_token.is_empty() {
            DEFAULT_IMAGE.to_string()
        } else {
            image_token
        };
        let image_remote_cfg = remotes
            .remote(&image_remote)
            .ok_or_else(|| RemoteError::UnknownRemote(image_remote.clone()))?;

        let (image_info, alias) = if image_remote_cfg.protocol == Protocol::Simplestreams {
            simplestreams_image(&image_token)
        } else if image_remote == remote {
            resolve_image_source(&server, &image_token).await?
        } else {
            let image_server = connector.image_server(image_remote_cfg).await?;
            resolve_image_source(&image_server, &image_token).await?
        };

        req.source = Source::Image {
            alias,
            fingerprint: None,
            server: None,
            protocol: None,
        };
        let mut op = server
            .create_instance_from_image(image_remote_cfg, &image_info, &req)
            .await?;
        track_operation(&mut op, sink, interrupt).await?
    };

    // The operation's resource map names what the server actually created.
    let instances = result
        .resources
        .get("instances")
        .filter(|refs| !refs.is_empty())
        .ok_or(ProvisionError::NoInstanceReported)?;
    if name.is_empty() && instances.len() == 1 {
        name = instances[0]
            .rsplit('/')
            .next()
            .unwrap_or(instances[0].as_str())
            .to_string();
        reporter.step(&format!("Instance name is: {name}"));
    }

    check_network(&server, &name, reporter).await;

    Ok(Provisioned { remote, name })
}

/// Advisory check after a successful creation: warn when the expanded
/// device set has no nic. Lookup failures are swallowed — provisioning
/// already succeeded.
async fn check_network(
    server: &impl InstanceServer,
    name: &str,
    reporter: &impl ProgressReporter,
) {
    let Ok(instance) = server.instance(name).await else {
        return;
    };
    if instance.has_nic() {
        return;
    }
    reporter.warn("The instance you created doesn't have any network attached to it.");
    reporter.warn("Add a nic device to it, or apply a profile that provides one.");
}
