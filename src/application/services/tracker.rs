//! Operation tracking: relay progress, race completion against interrupt.

use anyhow::Result;

use crate::application::ports::{Operation, ProgressSink};
use crate::domain::api::OperationResult;
use crate::domain::error::ProvisionError;

/// Drive a pending operation to a terminal state.
///
/// The progress stream is taken before the wait begins, so no event
/// emitted between submission and the wait can be dropped. The wait races
/// three conditions: a progress event (relayed to `sink`), operation
/// completion, and the external `interrupt`. On interrupt the wait is
/// abandoned, exactly one best-effort cancel is sent, and the call returns
/// promptly. The progress line is finalized on every exit path.
///
/// # Errors
///
/// Returns the operation's failure, or [`ProvisionError::Cancelled`] when
/// interrupted.
pub async fn track_operation<O: Operation>(
    op: &mut O,
    sink: &impl ProgressSink,
    interrupt: impl Future<Output = ()>,
) -> Result<OperationResult> {
    let mut events = op.subscribe();
    tokio::pin!(interrupt);

    // Pending events are drained ahead of the completion branch so the
    // listener observes every update in order before the result.
    let outcome = {
        let wait = op.wait();
        tokio::pin!(wait);
        loop {
            tokio::select! {
                biased;
                Some(update) = events.recv() => sink.update(&update),
                result = &mut wait => break Some(result),
                () = &mut interrupt => break None,
            }
        }
    };

    match outcome {
        Some(result) => {
            sink.done();
            result
        }
        None => {
            // Cancellation is cooperative: one request, no confirmation.
            let _ = op.cancel().await;
            sink.done();
            Err(ProvisionError::Cancelled.into())
        }
    }
}
