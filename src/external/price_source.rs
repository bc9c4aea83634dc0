use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PriceSourceError {
    #[error("no price available for {0}")]
    Unavailable(String),

    #[error("price fetch timed out for {0}")]
    Timeout(String),
}

/// Per-symbol price lookup. Implementations are external collaborators;
/// each symbol is independently callable so a batch refresh can fan out.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn get_price(&self, symbol: &str) -> Result<f64, PriceSourceError>;
}
