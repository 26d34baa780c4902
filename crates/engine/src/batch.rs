//! Sequential batch orchestration.

use atladmin_types::{BatchOutcome, StepRequest};
use tracing::info;

use crate::executor::StepExecutor;

/// Run every request in order and record each outcome.
///
/// A failed step never stops the batch: all requests are issued, so
/// `outcome.total()` always equals the number of requests.
pub async fn run_batch(executor: &StepExecutor, requests: impl IntoIterator<Item = StepRequest>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for request in requests {
        let result = executor.execute(&request).await;
        outcome.record(request, result);
    }

    info!(
        total = outcome.total(),
        succeeded = outcome.succeeded().len(),
        failed = outcome.failed().len(),
        "batch completed"
    );
    outcome
}
