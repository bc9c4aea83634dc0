use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetType {
    Stock,
    Crypto,
    Fund,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Bvc,
    Crypto,
}

// Represents the current open holding of a symbol within a wallet.
// Created on the first buy, re-averaged on every subsequent buy, and
// removed from the open set once a sell drains it to zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: uuid::Uuid,
    pub symbol: String,
    pub asset_type: AssetType,
    pub market: Market,
    pub quantity: f64,
    pub avg_cost: f64,
    pub total_invested: f64,
    /// Last observed market price, if any price pass has seen this symbol.
    pub current_price: Option<f64>,
    pub current_value: Option<f64>,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Position {
    pub fn open(symbol: String, asset_type: AssetType, market: Market, quantity: f64, price: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            symbol,
            asset_type,
            market,
            quantity,
            avg_cost: price,
            total_invested: quantity * price,
            current_price: None,
            current_value: None,
            last_updated: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Unrealized P&L, known only once a current price has been observed.
    pub fn profit_loss(&self) -> Option<f64> {
        self.current_value.map(|value| value - self.total_invested)
    }

    pub fn profit_loss_percent(&self) -> Option<f64> {
        self.profit_loss().map(|pnl| {
            if self.total_invested > 0.0 {
                pnl / self.total_invested * 100.0
            } else {
                0.0
            }
        })
    }
}

/// Read-only aggregate over the open positions of a wallet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PositionTotals {
    pub invested: f64,
    /// Positions that have never seen a price contribute their invested
    /// amount, so a freshly bought portfolio values at cost.
    pub current_value: f64,
}
