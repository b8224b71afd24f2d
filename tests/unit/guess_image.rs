//! Unit tests for the image-token fallback heuristic.

use vessel_cli::application::services::image::{guess_image, resolve_image_source};

use crate::mocks::{Fixture, MockServer, RecordingReporter, remotes_fixture};

#[tokio::test]
async fn unqualified_token_passes_through_without_probing() {
    let remotes = remotes_fixture();
    let server = MockServer::new(Fixture::default());
    let reporter = RecordingReporter::default();

    let (remote, image) =
        guess_image(&remotes, &server, "local", "local", "alpine", &reporter).await;

    assert_eq!((remote.as_str(), image.as_str()), ("local", "alpine"));
    // The token's head is not a configured remote, so no lookups happen.
    assert!(server.recorded_calls().is_empty());
    assert!(reporter.warnings().is_empty());
}

#[tokio::test]
async fn explicitly_qualified_remote_is_never_second_guessed() {
    let remotes = remotes_fixture();
    let server = MockServer::new(Fixture::default());
    let reporter = RecordingReporter::default();

    // Source remote differs from the target: the user already chose.
    let (remote, image) =
        guess_image(&remotes, &server, "local", "images", "ubuntu/20.04", &reporter).await;

    assert_eq!((remote.as_str(), image.as_str()), ("images", "ubuntu/20.04"));
    assert!(server.recorded_calls().is_empty());
}

#[tokio::test]
async fn slashed_alias_on_target_wins_over_remote_reinterpretation() {
    let remotes = remotes_fixture();
    // "ubuntu" is a configured remote AND "ubuntu/20.04" is a local alias.
    let server = MockServer::new(Fixture::default().with_alias("ubuntu/20.04", "abc123"));
    let reporter = RecordingReporter::default();

    let (remote, image) =
        guess_image(&remotes, &server, "local", "local", "ubuntu/20.04", &reporter).await;

    assert_eq!((remote.as_str(), image.as_str()), ("local", "ubuntu/20.04"));
    assert!(reporter.warnings().is_empty());
}

#[tokio::test]
async fn slashed_fingerprint_on_target_wins_over_remote_reinterpretation() {
    let remotes = remotes_fixture();
    let server = MockServer::new(Fixture::default().with_image("ubuntu/20.04"));
    let reporter = RecordingReporter::default();

    let (remote, image) =
        guess_image(&remotes, &server, "local", "local", "ubuntu/20.04", &reporter).await;

    assert_eq!((remote.as_str(), image.as_str()), ("local", "ubuntu/20.04"));
}

#[tokio::test]
async fn unresolvable_slashed_token_falls_back_to_the_named_remote() {
    let remotes = remotes_fixture();
    let server = MockServer::new(Fixture::default());
    let reporter = RecordingReporter::default();

    let (remote, image) =
        guess_image(&remotes, &server, "local", "local", "ubuntu/20.04", &reporter).await;

    assert_eq!((remote.as_str(), image.as_str()), ("ubuntu", "20.04"));
    // Both probes ran, in order, before the fallback.
    assert_eq!(
        server.recorded_calls(),
        vec!["image_alias:ubuntu/20.04", "image:ubuntu/20.04"]
    );
    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("ubuntu:20.04"), "got: {warnings:?}");
}

#[tokio::test]
async fn bare_remote_name_falls_back_to_its_default_image() {
    let remotes = remotes_fixture();
    let server = MockServer::new(Fixture::default());
    let reporter = RecordingReporter::default();

    let (remote, image) =
        guess_image(&remotes, &server, "local", "local", "ubuntu", &reporter).await;

    assert_eq!((remote.as_str(), image.as_str()), ("ubuntu", "default"));
    assert_eq!(reporter.warnings().len(), 1);
}

// ── resolve_image_source ─────────────────────────────────────────────────────

#[tokio::test]
async fn alias_resolution_preserves_the_original_alias_string() {
    let server = MockServer::new(Fixture::default().with_alias("default", "abc123"));

    let (image, alias) = resolve_image_source(&server, "default")
        .await
        .expect("resolvable");

    assert_eq!(image.fingerprint, "abc123");
    assert_eq!(alias.as_deref(), Some("default"));
}

#[tokio::test]
async fn raw_fingerprint_resolves_without_alias() {
    let server = MockServer::new(Fixture::default().with_image("abc123"));

    let (image, alias) = resolve_image_source(&server, "abc123")
        .await
        .expect("resolvable");

    assert_eq!(image.fingerprint, "abc123");
    assert_eq!(alias, None);
}

#[tokio::test]
async fn unresolvable_token_is_fatal_with_the_identifier() {
    let server = MockServer::new(Fixture::default());

    let err = resolve_image_source(&server, "ghost")
        .await
        .expect_err("no such image");

    assert!(err.to_string().contains("ghost"), "got: {err}");
}
