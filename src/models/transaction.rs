use serde::{Deserialize, Serialize};

use crate::models::{AssetType, Market};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

// Represents an executed buy or sell. Append-only audit trail: once
// recorded, a transaction is never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: uuid::Uuid,
    pub tx_type: TransactionType,
    pub symbol: String,
    pub asset_type: AssetType,
    pub market: Market,
    pub quantity: f64,
    pub price: f64,
    pub total_amount: f64,
    pub fee: f64,
    /// Booked profit/loss, present only on sells.
    pub realized_pnl: Option<f64>,
    pub notes: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tx_type: TransactionType,
        symbol: String,
        asset_type: AssetType,
        market: Market,
        quantity: f64,
        price: f64,
        fee: f64,
        realized_pnl: Option<f64>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            tx_type,
            symbol,
            asset_type,
            market,
            quantity,
            price,
            total_amount: quantity * price,
            fee,
            realized_pnl,
            notes,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Filter for ledger queries; every `Some` field must match.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub symbol: Option<String>,
    pub tx_type: Option<TransactionType>,
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(symbol) = &self.symbol {
            if &tx.symbol != symbol {
                return false;
            }
        }
        if let Some(tx_type) = self.tx_type {
            if tx.tx_type != tx_type {
                return false;
            }
        }
        if let Some(from) = self.from {
            if tx.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if tx.timestamp > to {
                return false;
            }
        }
        true
    }
}
