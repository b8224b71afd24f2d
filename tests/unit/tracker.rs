//! Unit tests for the operation tracker.

use std::time::Duration;

use vessel_cli::application::services::tracker::track_operation;
use vessel_cli::domain::api::{OperationResult, ProgressUpdate};

use crate::mocks::{MockOperation, RecordingSink, no_interrupt};

fn update(message: &str) -> ProgressUpdate {
    ProgressUpdate {
        message: message.to_string(),
        percent: None,
    }
}

#[tokio::test]
async fn all_progress_events_are_delivered_in_order_before_the_result() {
    let mut op = MockOperation::succeeding(
        vec![update("10%"), update("55%"), update("100%")],
        OperationResult::default(),
    );
    let sink = RecordingSink::default();

    let result = track_operation(&mut op, &sink, no_interrupt()).await;

    assert!(result.is_ok());
    assert_eq!(
        sink.recorded(),
        vec!["update:10%", "update:55%", "update:100%", "done"]
    );
    assert_eq!(op.cancel_count(), 0);
}

#[tokio::test]
async fn interrupt_unblocks_promptly_and_cancels_exactly_once() {
    let mut op = MockOperation::never_completing();
    let sink = RecordingSink::default();
    let interrupt = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    let result = tokio::time::timeout(
        Duration::from_secs(1),
        track_operation(&mut op, &sink, interrupt),
    )
    .await
    .expect("tracker must return within bounded time");

    let err = result.expect_err("interrupted wait is an error");
    assert!(err.to_string().contains("cancelled"), "got: {err}");
    assert_eq!(op.cancel_count(), 1);
    assert_eq!(sink.recorded(), vec!["done"]);
}

#[tokio::test]
async fn operation_failure_is_propagated_after_finalizing_the_line() {
    let mut op = MockOperation::failing(vec![update("3%")], "image download failed");
    let sink = RecordingSink::default();

    let err = track_operation(&mut op, &sink, no_interrupt())
        .await
        .expect_err("failure propagates");

    assert!(err.to_string().contains("image download failed"));
    // The line is finalized even on failure, with no success marker.
    assert_eq!(sink.recorded(), vec!["update:3%", "done"]);
    assert_eq!(op.cancel_count(), 0);
}
