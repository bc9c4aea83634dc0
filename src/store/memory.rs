use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{PortfolioSnapshot, Wallet};
use crate::store::{StoreError, WalletStore};

// Whole-wallet-replace store over DashMap. The bundled default; external
// deployments supply their own transactional implementation.
#[derive(Default)]
pub struct InMemoryWalletStore {
    wallets: DashMap<String, Wallet>,
    snapshots: DashMap<Uuid, Vec<PortfolioSnapshot>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn load(&self, user_id: &str) -> Result<Option<Wallet>, StoreError> {
        Ok(self.wallets.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, wallet: &Wallet) -> Result<(), StoreError> {
        self.wallets.insert(wallet.user_id.clone(), wallet.clone());
        Ok(())
    }

    async fn append_snapshot(&self, snapshot: &PortfolioSnapshot) -> Result<(), StoreError> {
        self.snapshots
            .entry(snapshot.wallet_id)
            .or_default()
            .push(snapshot.clone());
        Ok(())
    }

    async fn load_snapshots(&self, wallet_id: Uuid) -> Result<Vec<PortfolioSnapshot>, StoreError> {
        Ok(self
            .snapshots
            .get(&wallet_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn delete_snapshots(&self, wallet_id: Uuid) -> Result<(), StoreError> {
        self.snapshots.remove(&wallet_id);
        Ok(())
    }

    async fn user_ids(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.wallets.iter().map(|entry| entry.key().clone()).collect())
    }
}
