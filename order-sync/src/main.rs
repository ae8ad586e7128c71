use anyhow::Context;
use order_sync::{DraftsManager, ReconcileWorker, setup_environment};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. dotenv, config, logging
    let config = setup_environment();
    tracing::info!(
        work_dir = %config.work_dir,
        api = %config.api_base_url,
        seller_id = %config.seller_id,
        "Order sync starting"
    );

    std::fs::create_dir_all(&config.work_dir)
        .with_context(|| format!("creating work dir {}", config.work_dir))?;

    // 2. Remote client and draft manager (recovers interrupted submissions)
    let client = config
        .client_config()
        .build_client()
        .context("building order client")?;
    let manager = Arc::new(
        DraftsManager::new(config.db_path(), Arc::new(client), config.seller())
            .context("opening order storage")?,
    );

    // 3. One reconcile pass; offline is not fatal
    match manager.reconcile().await {
        Ok(report) => tracing::info!(?report, "Startup reconcile done"),
        Err(e) => tracing::warn!(error = %e, "Startup reconcile failed, continuing offline"),
    }

    let stats = manager.stats().context("reading storage stats")?;
    tracing::info!(
        drafts = stats.draft_count,
        failed_drafts = stats.failed_draft_count,
        orders = stats.order_count,
        pending = stats.pending_order_count,
        last_display_id = stats.last_display_id,
        "Draft backlog"
    );

    // 4. Optional periodic reconcile until Ctrl-C
    let Some(interval) = config.reconcile_interval() else {
        return Ok(());
    };

    let shutdown = CancellationToken::new();
    let worker = tokio::spawn(ReconcileWorker::new(manager.clone(), interval, shutdown.clone()).run());

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    tracing::info!("Shutdown requested");
    shutdown.cancel();
    worker.await.context("joining reconcile worker")?;

    Ok(())
}
