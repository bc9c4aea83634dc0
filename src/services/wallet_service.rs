use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::external::price_source::PriceSource;
use crate::models::{
    BuyOrder, HistoryPeriod, PortfolioSnapshot, SellOrder, Transaction, TransactionFilter,
    TransactionType, Wallet,
};
use crate::services::snapshot_service;
use crate::store::WalletStore;

/// Result of an executed order: the post-trade wallet and the ledger
/// entry it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedOrder {
    pub wallet: Wallet,
    pub transaction: Transaction,
}

/// Outcome of a batch price refresh. `skipped` marks a refresh that was
/// dropped because another one was already in flight for the wallet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceRefreshReport {
    pub updated: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: bool,
}

// Orchestrates order execution against the position book, the ledger,
// and the cash balance. Every mutating operation on a wallet runs under
// that wallet's exclusive lock, so funds/quantity checks and the
// mutation they guard are observed as one atomic step.
pub struct ValuationEngine {
    config: EngineConfig,
    store: Arc<dyn WalletStore>,
    price_source: Arc<dyn PriceSource>,
    wallet_locks: DashMap<String, Arc<Mutex<()>>>,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ValuationEngine {
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn WalletStore>,
        price_source: Arc<dyn PriceSource>,
    ) -> Self {
        Self {
            config,
            store,
            price_source,
            wallet_locks: DashMap::new(),
            refresh_locks: DashMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn wallet_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.wallet_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn refresh_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_or_provision(&self, user_id: &str) -> Result<Wallet, EngineError> {
        if let Some(wallet) = self.store.load(user_id).await? {
            return Ok(wallet);
        }
        let wallet = Wallet::new(
            user_id.to_string(),
            self.config.initial_balance,
            self.config.currency.clone(),
        );
        self.store.save(&wallet).await?;
        info!(
            "provisioned wallet for {} with balance {:.2} {}",
            user_id, wallet.balance, wallet.currency
        );
        Ok(wallet)
    }

    /// Current wallet state, provisioning a fresh wallet on first access.
    pub async fn get_wallet(&self, user_id: &str) -> Result<Wallet, EngineError> {
        let lock = self.wallet_lock(user_id);
        let _guard = lock.lock().await;
        self.load_or_provision(user_id).await
    }

    pub async fn execute_buy(
        &self,
        user_id: &str,
        order: BuyOrder,
    ) -> Result<ExecutedOrder, EngineError> {
        order.validate()?;

        let lock = self.wallet_lock(user_id);
        let _guard = lock.lock().await;

        let mut wallet = self.load_or_provision(user_id).await?;
        let fee = order.effective_fee(self.config.default_fee_rate);
        let cost = order.quantity * order.price + fee;
        if cost > wallet.balance {
            return Err(EngineError::InsufficientFunds {
                required: cost,
                available: wallet.balance,
            });
        }

        wallet.balance -= cost;
        wallet.positions.apply_buy(
            &order.symbol,
            order.asset_type,
            order.market,
            order.quantity,
            order.price,
        );
        // The executed price is also the freshest observation we have.
        wallet.positions.apply_price_update(&order.symbol, order.price);

        let transaction = Transaction::new(
            TransactionType::Buy,
            order.symbol.clone(),
            order.asset_type,
            order.market,
            order.quantity,
            order.price,
            fee,
            None,
            order.notes,
        );
        wallet.transactions.record(transaction.clone());

        self.store.save(&wallet).await?;
        info!(
            "buy executed for {}: {} {} @ {:.2}, fee {:.2}",
            user_id, order.quantity, order.symbol, order.price, fee
        );
        snapshot_service::record_after_trade(self.store.as_ref(), &wallet).await;

        Ok(ExecutedOrder {
            wallet,
            transaction,
        })
    }

    pub async fn execute_sell(
        &self,
        user_id: &str,
        order: SellOrder,
    ) -> Result<ExecutedOrder, EngineError> {
        order.validate()?;

        let lock = self.wallet_lock(user_id);
        let _guard = lock.lock().await;

        let mut wallet = self.load_or_provision(user_id).await?;
        let (asset_type, market) = {
            let position = wallet
                .positions
                .get(&order.symbol)
                .ok_or_else(|| EngineError::PositionNotFound(order.symbol.clone()))?;
            (position.asset_type, position.market)
        };

        let fee = order.effective_fee(self.config.default_fee_rate);
        let outcome = wallet.positions.apply_sell(
            &order.symbol,
            order.quantity,
            order.price,
            self.config.close_epsilon,
        )?;
        wallet.positions.apply_price_update(&order.symbol, order.price);

        let proceeds = order.quantity * order.price - fee;
        wallet.balance += proceeds;

        let transaction = Transaction::new(
            TransactionType::Sell,
            order.symbol.clone(),
            asset_type,
            market,
            order.quantity,
            order.price,
            fee,
            Some(outcome.realized_pnl),
            order.notes,
        );
        wallet.transactions.record(transaction.clone());

        self.store.save(&wallet).await?;
        info!(
            "sell executed for {}: {} {} @ {:.2}, realized pnl {:.2}{}",
            user_id,
            order.quantity,
            order.symbol,
            order.price,
            outcome.realized_pnl,
            if outcome.closed { " (position closed)" } else { "" }
        );
        snapshot_service::record_after_trade(self.store.as_ref(), &wallet).await;

        Ok(ExecutedOrder {
            wallet,
            transaction,
        })
    }

    /// Drops an open position without trading it out. The position's
    /// economics remain recoverable from the ledger.
    pub async fn close_position(
        &self,
        user_id: &str,
        symbol: &str,
    ) -> Result<Wallet, EngineError> {
        let lock = self.wallet_lock(user_id);
        let _guard = lock.lock().await;

        let mut wallet = self.load_or_provision(user_id).await?;
        wallet
            .positions
            .remove(symbol)
            .ok_or_else(|| EngineError::PositionNotFound(symbol.to_string()))?;
        self.store.save(&wallet).await?;
        info!("position {} removed for {}", symbol, user_id);
        Ok(wallet)
    }

    /// Destructive: clears positions, transactions, and snapshot history,
    /// and restores the cash balance.
    pub async fn reset_wallet(
        &self,
        user_id: &str,
        initial_balance: f64,
        currency: String,
    ) -> Result<Wallet, EngineError> {
        if !initial_balance.is_finite() || initial_balance < 0.0 {
            return Err(EngineError::Validation(
                "Initial balance must be finite and >= 0".into(),
            ));
        }

        let lock = self.wallet_lock(user_id);
        let _guard = lock.lock().await;

        let mut wallet = self.load_or_provision(user_id).await?;
        wallet.balance = initial_balance;
        wallet.currency = currency;
        wallet.positions.clear();
        wallet.transactions.clear();
        self.store.save(&wallet).await?;
        self.store.delete_snapshots(wallet.id).await?;
        warn!("wallet reset for {}", user_id);
        Ok(wallet)
    }

    /// Refreshes every held symbol from the price source. Fetches fan out
    /// in parallel and are individually bounded by the configured timeout;
    /// a failed symbol keeps its last known price and is reported, never
    /// aborting the rest of the batch. A refresh already in flight for the
    /// wallet causes this one to be skipped.
    pub async fn refresh_prices(&self, user_id: &str) -> Result<PriceRefreshReport, EngineError> {
        let refresh_lock = self.refresh_lock(user_id);
        let _refresh_guard = match refresh_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                info!("refresh already in flight for {}, skipping", user_id);
                return Ok(PriceRefreshReport {
                    skipped: true,
                    ..Default::default()
                });
            }
        };

        // Fetch phase: no wallet lock, runs fully in parallel. This read
        // must stay read-only; provisioning here would commit outside the
        // exclusive section and could overwrite a concurrent trade.
        let symbols: Vec<String> = match self.store.load(user_id).await? {
            Some(wallet) => wallet.positions.symbols().map(str::to_string).collect(),
            None => Vec::new(),
        };
        let fetches = symbols.iter().map(|symbol| {
            let source = Arc::clone(&self.price_source);
            let timeout = self.config.price_timeout;
            async move {
                let fetched = tokio::time::timeout(timeout, source.get_price(symbol)).await;
                match fetched {
                    Ok(Ok(price)) => Ok(price),
                    Ok(Err(e)) => {
                        warn!("price fetch failed for {}: {}", symbol, e);
                        Err(())
                    }
                    Err(_) => {
                        warn!(
                            "price fetch for {} timed out after {:?}",
                            symbol, timeout
                        );
                        Err(())
                    }
                }
            }
        });
        let results: Vec<Result<f64, ()>> = join_all(fetches).await;

        // Apply phase: same exclusive section as other mutations.
        let lock = self.wallet_lock(user_id);
        let _guard = lock.lock().await;
        let mut wallet = self.load_or_provision(user_id).await?;

        let mut report = PriceRefreshReport::default();
        for (symbol, result) in symbols.iter().zip(results) {
            match result {
                Ok(price) => {
                    // A symbol sold while we were fetching is discarded.
                    if wallet.positions.apply_price_update(symbol, price) {
                        report.updated.push(symbol.clone());
                    }
                }
                Err(()) => report.failed.push(symbol.clone()),
            }
        }
        self.store.save(&wallet).await?;
        info!(
            "price refresh for {}: {} updated, {} failed",
            user_id,
            report.updated.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// On-demand valuation snapshot of the wallet's current totals.
    pub async fn create_snapshot(&self, user_id: &str) -> Result<PortfolioSnapshot, EngineError> {
        let lock = self.wallet_lock(user_id);
        let _guard = lock.lock().await;

        let wallet = self.load_or_provision(user_id).await?;
        let snapshot = snapshot_service::create_snapshot(self.store.as_ref(), &wallet).await?;
        Ok(snapshot)
    }

    /// Snapshot history for the period, ascending by timestamp.
    pub async fn get_history(
        &self,
        user_id: &str,
        period: HistoryPeriod,
    ) -> Result<Vec<PortfolioSnapshot>, EngineError> {
        let wallet = self.get_wallet(user_id).await?;
        let history =
            snapshot_service::get_history(self.store.as_ref(), wallet.id, period).await?;
        Ok(history)
    }

    pub async fn get_transactions(
        &self,
        user_id: &str,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, EngineError> {
        let wallet = self.get_wallet(user_id).await?;
        Ok(wallet.transactions.query(&filter).cloned().collect())
    }

    /// Users with a stored wallet, for the background valuation pass.
    pub async fn known_users(&self) -> Result<Vec<String>, EngineError> {
        self.store.user_ids().await.map_err(|e| {
            error!("failed to list wallet users: {}", e);
            EngineError::from(e)
        })
    }
}
