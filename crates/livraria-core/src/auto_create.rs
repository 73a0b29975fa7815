//! Deferred expedition creation for completed orders.
//!
//! A status change to `completed` records a short-lived intent in the option
//! store and enqueues the order. The queue worker, like any interactive
//! trigger, runs [`OrderHandler::run_pending_auto_create`], which consumes the
//! intent atomically, so each intent leads to at most one creation attempt.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::error::HandlerError;
use crate::orchestrator::{AutoCreateOutcome, OrderHandler};

/// Lifetime of an auto-create intent.
pub const INTENT_TTL: Duration = Duration::from_secs(60);

/// Order status that triggers auto-create.
pub const COMPLETED_STATUS: &str = "completed";

/// Transient name holding the intent for `order_id`.
pub fn intent_key(order_id: u64) -> String {
    format!("livraria_auto_create_order_{order_id}")
}

/// Result of one queued run.
#[derive(Debug)]
pub struct AutoCreateRun {
    pub order_id: u64,
    pub outcome: Result<Option<AutoCreateOutcome>, HandlerError>,
}

/// Background worker draining queued auto-create requests in order.
pub struct AutoCreateQueue {
    handler: Arc<OrderHandler>,
    pending_tx: mpsc::UnboundedSender<u64>,
    worker: JoinHandle<Vec<AutoCreateRun>>,
}

impl AutoCreateQueue {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(handler: Arc<OrderHandler>) -> Self {
        let (pending_tx, mut pending_rx) = mpsc::unbounded_channel::<u64>();
        let worker_handler = Arc::clone(&handler);

        let worker = tokio::spawn(async move {
            let mut runs = Vec::new();
            while let Some(order_id) = pending_rx.recv().await {
                let outcome = worker_handler.run_pending_auto_create(order_id).await;
                match &outcome {
                    Ok(Some(AutoCreateOutcome::Created(expedition))) => tracing::info!(
                        order_id,
                        expedition_id = %expedition.expedition_id,
                        "auto-create finished"
                    ),
                    Ok(Some(other)) => tracing::info!(order_id, outcome = ?other, "auto-create skipped"),
                    Ok(None) => tracing::debug!(order_id, "auto-create intent already consumed"),
                    Err(error) => tracing::error!(
                        order_id,
                        code = error.code(),
                        error = %error,
                        "auto-create failed"
                    ),
                }
                runs.push(AutoCreateRun { order_id, outcome });
            }
            runs
        });

        Self {
            handler,
            pending_tx,
            worker,
        }
    }

    /// Status hook. Records an intent and enqueues the order when it moved to
    /// `completed` and auto-create is enabled. Returns whether it was queued.
    pub fn handle_order_status_change(
        &self,
        order_id: u64,
        old_status: &str,
        new_status: &str,
    ) -> Result<bool, HandlerError> {
        if new_status != COMPLETED_STATUS {
            return Ok(false);
        }

        let options = self.handler.options();
        if !Settings::load(options.as_ref())?.auto_create {
            tracing::debug!(order_id, "auto-create disabled, ignoring status change");
            return Ok(false);
        }

        options.set_transient(&intent_key(order_id), "1", INTENT_TTL)?;
        tracing::info!(order_id, from = old_status, to = new_status, "auto-create intent recorded");

        if self.pending_tx.send(order_id).is_err() {
            tracing::error!(order_id, "auto-create worker stopped, intent left for a later trigger");
            return Ok(false);
        }
        Ok(true)
    }

    /// Close the queue and wait until every queued order has been processed.
    pub async fn drain(self) -> Vec<AutoCreateRun> {
        drop(self.pending_tx);
        match self.worker.await {
            Ok(runs) => runs,
            Err(error) => {
                tracing::error!(error = %error, "auto-create worker panicked");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_key_names_the_order() {
        assert_eq!(intent_key(42), "livraria_auto_create_order_42");
    }
}
