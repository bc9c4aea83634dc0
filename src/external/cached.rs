use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::external::price_source::{PriceSource, PriceSourceError};

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    price: f64,
    fetched_at: DateTime<Utc>,
}

// TTL cache in front of a price source. Bounds load on the upstream when
// several wallets hold the same symbols or refresh close together.
pub struct CachedPriceSource {
    inner: Arc<dyn PriceSource>,
    cache: DashMap<String, CachedPrice>,
    ttl: chrono::Duration,
}

impl CachedPriceSource {
    pub fn new(inner: Arc<dyn PriceSource>, ttl: Duration) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::minutes(5)),
        }
    }

    pub fn invalidate(&self, symbol: &str) {
        self.cache.remove(symbol);
    }
}

#[async_trait]
impl PriceSource for CachedPriceSource {
    async fn get_price(&self, symbol: &str) -> Result<f64, PriceSourceError> {
        if let Some(entry) = self.cache.get(symbol) {
            if Utc::now() - entry.fetched_at < self.ttl {
                debug!("price cache hit for {}", symbol);
                return Ok(entry.price);
            }
            drop(entry);
            self.cache.remove(symbol);
        }

        let price = self.inner.get_price(symbol).await?;
        self.cache.insert(
            symbol.to_string(),
            CachedPrice {
                price,
                fetched_at: Utc::now(),
            },
        );
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for CountingSource {
        async fn get_price(&self, _symbol: &str) -> Result<f64, PriceSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(42.0)
        }
    }

    #[tokio::test]
    async fn second_fetch_within_ttl_hits_cache() {
        let inner = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedPriceSource::new(inner.clone(), Duration::from_secs(60));

        assert_eq!(cached.get_price("ATW").await.unwrap(), 42.0);
        assert_eq!(cached.get_price("ATW").await.unwrap(), 42.0);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let inner = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedPriceSource::new(inner.clone(), Duration::from_secs(60));

        cached.get_price("ATW").await.unwrap();
        cached.invalidate("ATW");
        cached.get_price("ATW").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
