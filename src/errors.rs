use thiserror::Error;

use crate::external::price_source::PriceSourceError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Insufficient funds: required {required:.2}, available {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },
    #[error("Insufficient quantity for {symbol}: required {requested}, available {available}")]
    InsufficientQuantity {
        symbol: String,
        requested: f64,
        available: f64,
    },
    #[error("No open position for {0}")]
    PositionNotFound(String),
    #[error("Price unavailable for {0}")]
    PriceUnavailable(String),
    #[error("Wallet was modified concurrently, retry the operation")]
    ConcurrentModification,
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict => EngineError::ConcurrentModification,
            other => EngineError::Store(other),
        }
    }
}

impl From<PriceSourceError> for EngineError {
    fn from(value: PriceSourceError) -> Self {
        match value {
            PriceSourceError::Unavailable(symbol) => EngineError::PriceUnavailable(symbol),
            PriceSourceError::Timeout(symbol) => EngineError::PriceUnavailable(symbol),
        }
    }
}

impl From<String> for EngineError {
    fn from(value: String) -> Self {
        EngineError::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflict_maps_to_retryable_concurrent_modification() {
        assert!(matches!(
            EngineError::from(StoreError::Conflict),
            EngineError::ConcurrentModification
        ));
    }

    #[test]
    fn other_store_failures_stay_store_errors() {
        assert!(matches!(
            EngineError::from(StoreError::NotFound),
            EngineError::Store(StoreError::NotFound)
        ));
        assert!(matches!(
            EngineError::from(StoreError::Backend("io".to_string())),
            EngineError::Store(StoreError::Backend(_))
        ));
    }
}
