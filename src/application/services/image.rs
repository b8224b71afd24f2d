//! Image reference resolution.
//!
//! Two concerns live here: the fallback heuristic that disambiguates
//! "local alias containing a slash" from "user meant remote/image"
//! ([`guess_image`]), and the source determination that turns a token into
//! image metadata plus a preserved alias string
//! ([`resolve_image_source`]).

use anyhow::Result;

use crate::application::ports::{ImageServer, ProgressReporter};
use crate::domain::api::Image;
use crate::domain::error::RemoteError;
use crate::domain::remotes::{DEFAULT_IMAGE, RemotesConfig};

/// Re-interpret an image token that failed to qualify a remote.
///
/// The token is returned unchanged when the user already qualified a
/// different source remote, when its head does not name a configured
/// remote, or when it really does resolve on the target server (an alias
/// or fingerprint that happens to contain a slash). Only then is the head
/// treated as the remote to search, with an advisory on the error channel
/// explaining the substitution.
///
/// Probes run as an ordered chain with early return; a probe that fails
/// with a transport error counts as "did not resolve" here — resolution
/// outside the guessing path remains fatal.
pub async fn guess_image(
    remotes: &RemotesConfig,
    server: &impl ImageServer,
    remote: &str,
    image_remote: &str,
    image: &str,
    reporter: &impl ProgressReporter,
) -> (String, String) {
    if remote != image_remote {
        return (image_remote.to_string(), image.to_string());
    }

    let (head, rest) = match image.split_once('/') {
        Some((head, rest)) => (head, Some(rest)),
        None => (image, None),
    };
    if !remotes.has_remote(head) {
        return (image_remote.to_string(), image.to_string());
    }

    if probe_alias(server, image).await || probe_fingerprint(server, image).await {
        return (image_remote.to_string(), image.to_string());
    }

    let substitute = rest.unwrap_or(DEFAULT_IMAGE);
    reporter.warn(&format!(
        "The local image '{image}' couldn't be found, trying '{head}:{substitute}' instead"
    ));
    (head.to_string(), substitute.to_string())
}

/// True if the token resolves as an alias on `server`.
async fn probe_alias(server: &impl ImageServer, token: &str) -> bool {
    matches!(server.image_alias(token).await, Ok(Some(_)))
}

/// True if the token resolves as a raw fingerprint on `server`.
async fn probe_fingerprint(server: &impl ImageServer, token: &str) -> bool {
    matches!(server.image(token).await, Ok(Some(_)))
}

/// Synthesize image metadata for a streaming-catalog remote.
///
/// The catalog protocol content-addresses images server-side, so alias and
/// metadata lookups are skipped entirely: the token is both the recorded
/// alias and the fingerprint, and the image is public by definition. This
/// fast path is required, not an optimization.
#[must_use]
pub fn simplestreams_image(token: &str) -> (Image, Option<String>) {
    let image = Image {
        fingerprint: token.to_string(),
        public: true,
        ..Image::default()
    };
    (image, Some(token.to_string()))
}

/// Resolve a token on a full management server into image metadata and the
/// preserved alias string.
///
/// Alias resolution is attempted first; on success the original alias
/// string is kept for the request while the resolved fingerprint drives
/// the metadata fetch. A token that is neither alias nor fingerprint is
/// fatal.
///
/// # Errors
///
/// Returns [`RemoteError::ImageNotFound`] when no image matches, or the
/// transport error from the metadata fetch.
pub async fn resolve_image_source(
    server: &impl ImageServer,
    token: &str,
) -> Result<(Image, Option<String>)> {
    let mut fingerprint = token.to_string();
    let mut alias = None;
    if let Ok(Some(resolved)) = server.image_alias(token).await {
        alias = Some(token.to_string());
        fingerprint = resolved.target;
    }

    let image = server
        .image(&fingerprint)
        .await?
        .ok_or_else(|| RemoteError::ImageNotFound(fingerprint.clone()))?;
    Ok((image, alias))
}
