pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{PortfolioSnapshot, Wallet};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("wallet not found")]
    NotFound,

    /// Lost-update conflict reported by a transactional backend.
    #[error("conflicting concurrent update")]
    Conflict,

    #[error("backend error: {0}")]
    Backend(String),
}

/// Persistence contract. `save` replaces the whole wallet (balance,
/// positions, and transactions together); the engine assumes
/// read-your-writes consistency from the implementation.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<Wallet>, StoreError>;

    async fn save(&self, wallet: &Wallet) -> Result<(), StoreError>;

    async fn append_snapshot(&self, snapshot: &PortfolioSnapshot) -> Result<(), StoreError>;

    async fn load_snapshots(&self, wallet_id: Uuid) -> Result<Vec<PortfolioSnapshot>, StoreError>;

    async fn delete_snapshots(&self, wallet_id: Uuid) -> Result<(), StoreError>;

    /// Users with a stored wallet, for background valuation passes.
    async fn user_ids(&self) -> Result<Vec<String>, StoreError>;
}
