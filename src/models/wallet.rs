use serde::{Deserialize, Serialize};

use crate::book::PositionBook;
use crate::ledger::TransactionLedger;
use crate::models::Transaction;

// A user's virtual wallet: cash balance, open positions, and the full
// transaction history. Balance and position cost basis only ever change
// together with a ledger append; the engine enforces this pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: uuid::Uuid,
    pub user_id: String,
    pub balance: f64,
    pub currency: String,
    pub positions: PositionBook,
    pub transactions: TransactionLedger,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Wallet {
    pub fn new(user_id: String, balance: f64, currency: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            user_id,
            balance,
            currency,
            positions: PositionBook::new(),
            transactions: TransactionLedger::new(),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn summary(&self) -> WalletSummary {
        let totals = self.positions.totals();
        let profit_loss = totals.current_value - totals.invested;
        let profit_loss_percent = if totals.invested > 0.0 {
            profit_loss / totals.invested * 100.0
        } else {
            0.0
        };
        WalletSummary {
            total_invested: totals.invested,
            total_current_value: totals.current_value,
            total_profit_loss: profit_loss,
            total_profit_loss_percent: profit_loss_percent,
            available_balance: self.balance,
            total_value: self.balance + totals.current_value,
        }
    }

    /// Most recent transactions, newest first.
    pub fn recent_transactions(&self, limit: usize) -> Vec<Transaction> {
        let mut recent: Vec<Transaction> = self.transactions.iter().cloned().collect();
        recent.sort_by_key(|tx| std::cmp::Reverse(tx.timestamp));
        recent.truncate(limit);
        recent
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WalletSummary {
    pub total_invested: f64,
    pub total_current_value: f64,
    pub total_profit_loss: f64,
    pub total_profit_loss_percent: f64,
    pub available_balance: f64,
    pub total_value: f64,
}
