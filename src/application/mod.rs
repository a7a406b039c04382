//! Application layer containing the payout pipeline orchestration.
//!
//! [`orchestrator::PayoutOrchestrator`] is the entry point; it sequences the
//! domain stages and hands payment execution to [`retry::RetryCoordinator`].
//! Both are `Send + Sync` and meant to be shared across tasks behind an `Arc`.

pub mod orchestrator;
pub mod retry;

use crate::domain::event::PipelineEvent;
use crate::domain::ports::EventSink;
use tracing::warn;

/// Appends an event, logging instead of failing when the sink errors.
pub(crate) async fn record_event(sink: &dyn EventSink, event: PipelineEvent) {
    let transaction_id = event.transaction_id.clone();
    let stage = event.stage;
    if let Err(err) = sink.append(event).await {
        warn!(
            transaction_id = %transaction_id,
            stage = %stage,
            error = %err,
            "Failed to record pipeline event"
        );
    }
}
