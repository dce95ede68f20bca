use anyhow::Result;
use p2p_market_aggregator::{aggregator, config::AppConfig, utils};
use tokio::sync::watch;

/// Price levels logged per snapshot.
const LOGGED_LEVELS: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::load()?;
    tracing::info!(source = %config.source, "[INIT] p2p-market-aggregator starting");

    let (snapshot_tx, mut snapshot_rx) = watch::channel(None);
    let agg_task = aggregator::spawn_market_aggregator(config.source, config.aggregator, snapshot_tx);

    // Renderer: log every new snapshot until Ctrl-C.
    let render_task = tokio::spawn(async move {
        while snapshot_rx.changed().await.is_ok() {
            let snapshot = snapshot_rx.borrow_and_update().clone();
            if let Some(snapshot) = snapshot {
                utils::log_snapshot(&snapshot, LOGGED_LEVELS);
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("[SHUTDOWN] ctrl-c received");
    agg_task.abort();
    let (agg_result, render_result) = futures::join!(agg_task, render_task);
    for (task, result) in [("aggregator", agg_result), ("renderer", render_result)] {
        if let Err(e) = result {
            if !e.is_cancelled() {
                tracing::error!(task, error = %e, "[SHUTDOWN] task failed");
            }
        }
    }
    Ok(())
}
