use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::EngineError;
use crate::models::{AssetType, Market, Position, PositionTotals};

/// Result of applying a sell to the book. The realized P&L is the one
/// piece of derived state the ledger cannot compute on its own.
#[derive(Debug, Clone, Copy)]
pub struct SellOutcome {
    pub realized_pnl: f64,
    pub remaining_quantity: f64,
    pub closed: bool,
}

// Owns the symbol -> open position mapping and all cost-basis arithmetic.
// Buys re-average, sells keep the per-unit cost of remaining units, and a
// position whose quantity drains to within epsilon of zero is removed. A
// later buy of the same symbol starts a fresh position with a fresh basis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionBook {
    open: HashMap<String, Position>,
}

impl PositionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_buy(
        &mut self,
        symbol: &str,
        asset_type: AssetType,
        market: Market,
        quantity: f64,
        price: f64,
    ) {
        match self.open.get_mut(symbol) {
            Some(position) => {
                let new_quantity = position.quantity + quantity;
                let new_avg_cost =
                    (position.quantity * position.avg_cost + quantity * price) / new_quantity;
                position.quantity = new_quantity;
                position.avg_cost = new_avg_cost;
                position.total_invested = new_quantity * new_avg_cost;
            }
            None => {
                self.open.insert(
                    symbol.to_string(),
                    Position::open(symbol.to_string(), asset_type, market, quantity, price),
                );
            }
        }
    }

    pub fn apply_sell(
        &mut self,
        symbol: &str,
        quantity: f64,
        price: f64,
        close_epsilon: f64,
    ) -> Result<SellOutcome, EngineError> {
        let position = self
            .open
            .get_mut(symbol)
            .ok_or_else(|| EngineError::PositionNotFound(symbol.to_string()))?;

        if quantity > position.quantity {
            return Err(EngineError::InsufficientQuantity {
                symbol: symbol.to_string(),
                requested: quantity,
                available: position.quantity,
            });
        }

        let realized_pnl = quantity * (price - position.avg_cost);
        position.quantity -= quantity;
        position.total_invested = position.quantity * position.avg_cost;
        if let Some(current_price) = position.current_price {
            position.current_value = Some(position.quantity * current_price);
        }

        let remaining_quantity = position.quantity;
        let closed = remaining_quantity <= close_epsilon;
        if closed {
            self.open.remove(symbol);
            debug!("position {} closed", symbol);
        }

        Ok(SellOutcome {
            realized_pnl,
            remaining_quantity,
            closed,
        })
    }

    /// Applies an observed market price. Stale prices for symbols no
    /// longer held are discarded.
    pub fn apply_price_update(&mut self, symbol: &str, price: f64) -> bool {
        match self.open.get_mut(symbol) {
            Some(position) => {
                position.current_price = Some(price);
                position.current_value = Some(position.quantity * price);
                position.last_updated = Some(chrono::Utc::now());
                true
            }
            None => false,
        }
    }

    /// Aggregate invested/current value over open positions. Positions
    /// without an observed price are valued at cost.
    pub fn totals(&self) -> PositionTotals {
        let mut totals = PositionTotals::default();
        for position in self.open.values() {
            totals.invested += position.total_invested;
            totals.current_value += position.current_value.unwrap_or(position.total_invested);
        }
        totals
    }

    pub fn get(&self, symbol: &str) -> Option<&Position> {
        self.open.get(symbol)
    }

    pub fn remove(&mut self, symbol: &str) -> Option<Position> {
        self.open.remove(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.open.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.open.values()
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn clear(&mut self) {
        self.open.clear();
    }
}
