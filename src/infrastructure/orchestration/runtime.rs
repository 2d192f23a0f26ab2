//! Keeper runtime lifecycle.

use std::sync::Arc;

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::application::rebalance::RebalanceScheduler;
use crate::domain::pass::RebalancePass;
use crate::error::Result;
use crate::infrastructure::bootstrap::build_scheduler;
use crate::infrastructure::config::settings::Config;

/// Run the keeper until ctrl-c.
pub async fn run(config: Config) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => warn!(error = %e, "Failed to listen for ctrl-c, shutting down"),
        }
        let _ = shutdown_tx.send(true);
    });
    run_with_shutdown(config, shutdown_rx).await
}

/// Run with externally controlled shutdown signal.
pub async fn run_with_shutdown(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    info!(
        chain_id = config.chain.chain_id,
        interval_secs = config.scheduler.interval_secs,
        backend = ?config.registry.backend,
        "Starting rebalance keeper"
    );
    let scheduler = build_scheduler(&config)?;
    run_scheduler(scheduler, shutdown).await;
    Ok(())
}

/// Drive `scheduler` until `shutdown` flips to true (or its sender drops),
/// then let the current pass finish.
pub async fn run_scheduler(scheduler: Arc<RebalanceScheduler>, mut shutdown: watch::Receiver<bool>) {
    let handle = scheduler.start();

    loop {
        if *shutdown.borrow() {
            break;
        }
        if shutdown.changed().await.is_err() {
            info!("Shutdown channel closed");
            break;
        }
    }

    handle.stop().await;
    info!("Rebalance keeper stopped");
}

/// Build everything from `config` and run a single pass.
pub async fn run_once(config: &Config) -> Result<RebalancePass> {
    let scheduler = build_scheduler(config)?;
    Ok(scheduler.run_pass().await)
}
