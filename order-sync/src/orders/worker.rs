//! Periodic reconcile worker
//!
//! Pulls the remote order list on a fixed interval until shutdown. Failures
//! are logged and retried on the next tick; pending orders stay pending.

use super::manager::DraftsManager;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct ReconcileWorker {
    manager: Arc<DraftsManager>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ReconcileWorker {
    pub fn new(manager: Arc<DraftsManager>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            manager,
            interval,
            shutdown,
        }
    }

    /// Main loop: reconcile every `interval` until cancelled
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Reconcile worker started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // the first tick fires immediately; startup already reconciled
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Reconcile worker received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    match self.manager.reconcile().await {
                        Ok(report) => {
                            let pending = self
                                .manager
                                .pending_orders()
                                .map(|orders| orders.len())
                                .unwrap_or_default();
                            tracing::debug!(merged = report.merged, pending, "Periodic reconcile done");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Periodic reconcile failed, will retry");
                        }
                    }
                }
            }
        }

        tracing::info!("Reconcile worker stopped");
    }
}
