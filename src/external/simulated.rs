use async_trait::async_trait;
use dashmap::DashMap;

use crate::external::price_source::{PriceSource, PriceSourceError};

// Random-walk price source for demos and tests. Each symbol starts at a
// seeded price and drifts up to +/-1% per observation.
pub struct SimulatedPriceSource {
    last: DashMap<String, f64>,
    start_price: f64,
}

impl SimulatedPriceSource {
    pub fn new(start_price: f64) -> Self {
        Self {
            last: DashMap::new(),
            start_price,
        }
    }

    pub fn seed(&self, symbol: &str, price: f64) {
        self.last.insert(symbol.to_string(), price);
    }
}

impl Default for SimulatedPriceSource {
    fn default() -> Self {
        Self::new(100.0)
    }
}

#[async_trait]
impl PriceSource for SimulatedPriceSource {
    async fn get_price(&self, symbol: &str) -> Result<f64, PriceSourceError> {
        let mut entry = self
            .last
            .entry(symbol.to_string())
            .or_insert(self.start_price);
        let next = *entry * (1.0 + (rand::random::<f64>() - 0.5) * 0.02);
        *entry = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn walk_stays_near_seed() {
        let source = SimulatedPriceSource::default();
        source.seed("ATW", 500.0);
        let price = source.get_price("ATW").await.unwrap();
        assert!((price - 500.0).abs() <= 5.0);
    }

    #[tokio::test]
    async fn unseeded_symbol_starts_at_default() {
        let source = SimulatedPriceSource::new(100.0);
        let price = source.get_price("NEW").await.unwrap();
        assert!((price - 100.0).abs() <= 1.0);
    }
}
