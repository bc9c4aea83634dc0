use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::services::wallet_service::ValuationEngine;

/// One valuation pass: refresh prices and snapshot every known wallet.
/// Per-wallet failures are logged and skipped; the pass always finishes.
pub async fn run_once(engine: &ValuationEngine) {
    let users = match engine.known_users().await {
        Ok(users) => users,
        Err(e) => {
            error!("valuation pass aborted, cannot list wallets: {}", e);
            return;
        }
    };

    for user_id in users {
        match engine.refresh_prices(&user_id).await {
            Ok(report) if report.skipped => continue,
            Ok(_) => {}
            Err(e) => {
                error!("price refresh failed for {}: {}", user_id, e);
                continue;
            }
        }
        if let Err(e) = engine.create_snapshot(&user_id).await {
            error!("periodic snapshot failed for {}: {}", user_id, e);
        }
    }
}

/// Spawns the periodic valuation loop at the engine's configured
/// interval. Flipping the shutdown channel to `true` stops the loop.
pub fn spawn(engine: Arc<ValuationEngine>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    let period = engine.config().snapshot_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick of an interval fires immediately.
        ticker.tick().await;
        info!("valuation job started, interval {:?}", period);
        loop {
            tokio::select! {
                _ = ticker.tick() => run_once(&engine).await,
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("valuation job stopping");
                        break;
                    }
                }
            }
        }
    })
}
