use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::{AssetType, Market};

fn symbol_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9][A-Z0-9.\-]{0,11}$").unwrap())
}

fn validate_symbol(symbol: &str) -> Result<(), EngineError> {
    if symbol.trim().is_empty() {
        return Err(EngineError::Validation("Symbol cannot be empty".into()));
    }
    if !symbol_pattern().is_match(symbol) {
        return Err(EngineError::Validation(format!(
            "Malformed symbol: {symbol}"
        )));
    }
    Ok(())
}

fn validate_amounts(quantity: f64, price: f64, fee: f64) -> Result<(), EngineError> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(EngineError::Validation("Quantity must be > 0".into()));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(EngineError::Validation("Price must be >= 0".into()));
    }
    if !fee.is_finite() || fee < 0.0 {
        return Err(EngineError::Validation("Fee must be >= 0".into()));
    }
    Ok(())
}

// Validated request structs for the engine entry points. Requests are
// rejected before any wallet state is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyOrder {
    pub symbol: String,
    pub asset_type: AssetType,
    pub market: Market,
    pub quantity: f64,
    pub price: f64,
    /// Commission; when absent the engine applies the configured flat rate.
    pub fee: Option<f64>,
    pub notes: Option<String>,
}

impl BuyOrder {
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_symbol(&self.symbol)?;
        validate_amounts(self.quantity, self.price, self.fee.unwrap_or(0.0))
    }

    /// Fee to charge: explicit fee if provided, otherwise rate on notional.
    pub fn effective_fee(&self, default_rate: f64) -> f64 {
        self.fee
            .unwrap_or_else(|| self.quantity * self.price * default_rate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellOrder {
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
    pub fee: Option<f64>,
    pub notes: Option<String>,
}

impl SellOrder {
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_symbol(&self.symbol)?;
        validate_amounts(self.quantity, self.price, self.fee.unwrap_or(0.0))
    }

    pub fn effective_fee(&self, default_rate: f64) -> f64 {
        self.fee
            .unwrap_or_else(|| self.quantity * self.price * default_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(symbol: &str, quantity: f64, price: f64) -> BuyOrder {
        BuyOrder {
            symbol: symbol.to_string(),
            asset_type: AssetType::Stock,
            market: Market::Bvc,
            quantity,
            price,
            fee: None,
            notes: None,
        }
    }

    #[test]
    fn accepts_well_formed_order() {
        assert!(buy("ATW", 10.0, 510.0).validate().is_ok());
        assert!(buy("BTC-USD", 0.1, 300_000.0).validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_quantity() {
        assert!(buy("ATW", 0.0, 510.0).validate().is_err());
        assert!(buy("ATW", -1.0, 510.0).validate().is_err());
    }

    #[test]
    fn rejects_negative_or_non_finite_price() {
        assert!(buy("ATW", 1.0, -510.0).validate().is_err());
        assert!(buy("ATW", 1.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn rejects_malformed_symbol() {
        assert!(buy("", 1.0, 510.0).validate().is_err());
        assert!(buy("atw", 1.0, 510.0).validate().is_err());
        assert!(buy("A TW", 1.0, 510.0).validate().is_err());
    }

    #[test]
    fn default_fee_is_rate_on_notional() {
        let order = buy("ATW", 100.0, 510.0);
        assert_eq!(order.effective_fee(0.005), 255.0);
    }

    #[test]
    fn explicit_fee_wins_over_rate() {
        let mut order = buy("ATW", 100.0, 510.0);
        order.fee = Some(10.0);
        assert_eq!(order.effective_fee(0.005), 10.0);
    }
}
