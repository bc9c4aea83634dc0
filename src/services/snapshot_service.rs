use tracing::warn;
use uuid::Uuid;

use crate::models::{HistoryPeriod, PeriodPnL, PortfolioSnapshot, Wallet};
use crate::store::{StoreError, WalletStore};

/// Derives a snapshot of the wallet's current totals. Profit/loss here is
/// unrealized P&L over open positions only; realized P&L already sits in
/// the cash balance via sale proceeds.
pub fn build_snapshot(wallet: &Wallet) -> PortfolioSnapshot {
    let summary = wallet.summary();
    PortfolioSnapshot {
        id: Uuid::new_v4(),
        wallet_id: wallet.id,
        total_value: summary.total_value,
        invested_value: summary.total_invested,
        available_balance: summary.available_balance,
        profit_loss: summary.total_profit_loss,
        profit_loss_percent: summary.total_profit_loss_percent,
        timestamp: chrono::Utc::now(),
    }
}

pub async fn create_snapshot(
    store: &dyn WalletStore,
    wallet: &Wallet,
) -> Result<PortfolioSnapshot, StoreError> {
    let snapshot = build_snapshot(wallet);
    store.append_snapshot(&snapshot).await?;
    Ok(snapshot)
}

/// Best-effort snapshot after a trade; a snapshot failure never fails the
/// trade that triggered it.
pub async fn record_after_trade(store: &dyn WalletStore, wallet: &Wallet) {
    if let Err(e) = create_snapshot(store, wallet).await {
        warn!("post-trade snapshot failed for wallet {}: {}", wallet.id, e);
    }
}

/// Stored snapshots within the period, sorted ascending by timestamp.
/// Storage order is not trusted; consumers always get a sorted view.
pub async fn get_history(
    store: &dyn WalletStore,
    wallet_id: Uuid,
    period: HistoryPeriod,
) -> Result<Vec<PortfolioSnapshot>, StoreError> {
    let start = period.start_from(chrono::Utc::now());
    let mut history: Vec<PortfolioSnapshot> = store
        .load_snapshots(wallet_id)
        .await?
        .into_iter()
        .filter(|snapshot| start.map_or(true, |s| snapshot.timestamp >= s))
        .collect();
    history.sort_by_key(|snapshot| snapshot.timestamp);
    Ok(history)
}

/// Change in total value across an ascending history window.
pub fn period_pnl(history: &[PortfolioSnapshot]) -> PeriodPnL {
    let (Some(first), Some(last)) = (history.first(), history.last()) else {
        return PeriodPnL::default();
    };
    let change = last.total_value - first.total_value;
    let percent = if first.total_value > 0.0 {
        change / first.total_value * 100.0
    } else {
        0.0
    };
    PeriodPnL { change, percent }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryWalletStore;

    fn snapshot_at(
        wallet_id: Uuid,
        total_value: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> PortfolioSnapshot {
        PortfolioSnapshot {
            id: Uuid::new_v4(),
            wallet_id,
            total_value,
            invested_value: 0.0,
            available_balance: total_value,
            profit_loss: 0.0,
            profit_loss_percent: 0.0,
            timestamp,
        }
    }

    #[test]
    fn snapshot_separates_unrealized_pnl_from_cash() {
        let mut wallet = Wallet::new("u".to_string(), 1_000.0, "MAD".to_string());
        wallet.positions.apply_buy(
            "ATW",
            crate::models::AssetType::Stock,
            crate::models::Market::Bvc,
            10.0,
            50.0,
        );
        wallet.positions.apply_price_update("ATW", 60.0);

        let snapshot = build_snapshot(&wallet);
        assert_eq!(snapshot.available_balance, 1_000.0);
        assert_eq!(snapshot.invested_value, 500.0);
        assert_eq!(snapshot.profit_loss, 100.0);
        assert_eq!(snapshot.profit_loss_percent, 20.0);
        assert_eq!(snapshot.total_value, 1_000.0 + 600.0);
    }

    #[tokio::test]
    async fn history_is_sorted_ascending_regardless_of_storage_order() {
        let store = InMemoryWalletStore::new();
        let wallet_id = Uuid::new_v4();
        let now = chrono::Utc::now();

        // Appended newest-first on purpose.
        store
            .append_snapshot(&snapshot_at(wallet_id, 1_200.0, now))
            .await
            .unwrap();
        store
            .append_snapshot(&snapshot_at(
                wallet_id,
                1_000.0,
                now - chrono::Duration::days(2),
            ))
            .await
            .unwrap();

        let history = get_history(&store, wallet_id, HistoryPeriod::Max)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].timestamp < history[1].timestamp);

        let pnl = period_pnl(&history);
        assert_eq!(pnl.change, 200.0);
        assert_eq!(pnl.percent, 20.0);
    }

    #[tokio::test]
    async fn period_filter_drops_old_snapshots() {
        let store = InMemoryWalletStore::new();
        let wallet_id = Uuid::new_v4();
        let now = chrono::Utc::now();

        store
            .append_snapshot(&snapshot_at(
                wallet_id,
                900.0,
                now - chrono::Duration::days(40),
            ))
            .await
            .unwrap();
        store
            .append_snapshot(&snapshot_at(wallet_id, 1_100.0, now))
            .await
            .unwrap();

        let month = get_history(&store, wallet_id, HistoryPeriod::Month)
            .await
            .unwrap();
        assert_eq!(month.len(), 1);

        let max = get_history(&store, wallet_id, HistoryPeriod::Max)
            .await
            .unwrap();
        assert_eq!(max.len(), 2);
    }

    #[test]
    fn empty_history_yields_zero_pnl() {
        assert_eq!(period_pnl(&[]), PeriodPnL::default());
    }

    #[test]
    fn zero_start_value_yields_zero_percent() {
        let wallet_id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let history = vec![
            snapshot_at(wallet_id, 0.0, now - chrono::Duration::days(1)),
            snapshot_at(wallet_id, 500.0, now),
        ];
        let pnl = period_pnl(&history);
        assert_eq!(pnl.change, 500.0);
        assert_eq!(pnl.percent, 0.0);
    }
}
