//! In-memory trade store for tests without a database.

use super::{StoreError, TradeStore};
use crate::domain::TradeRow;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Trade store that allocates ids in memory.
///
/// Ids are assigned per table in request order starting at 1; individual
/// ids can be pinned up front with the builder methods.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: IdTable,
    assets: IdTable,
    pools: IdTable,
    trades: Vec<TradeRow>,
}

#[derive(Debug)]
struct IdTable {
    ids: HashMap<String, i64>,
    next: i64,
}

impl Default for IdTable {
    fn default() -> Self {
        IdTable {
            ids: HashMap::new(),
            next: 1,
        }
    }
}

impl IdTable {
    fn seed(&mut self, key: &str, id: i64) {
        self.ids.insert(key.to_string(), id);
        self.next = self.next.max(id + 1);
    }

    fn resolve(&mut self, keys: &[String]) -> HashMap<String, i64> {
        let mut out = HashMap::with_capacity(keys.len());
        for key in keys {
            let id = *self.ids.entry(key.clone()).or_insert_with(|| {
                let id = self.next;
                self.next += 1;
                id
            });
            out.insert(key.clone(), id);
        }
        out
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the id an account address resolves to.
    pub fn with_account_id(mut self, address: &str, id: i64) -> Self {
        self.inner.get_mut().accounts.seed(address, id);
        self
    }

    /// Pin the id a canonical asset string resolves to.
    pub fn with_asset_id(mut self, asset: &str, id: i64) -> Self {
        self.inner.get_mut().assets.seed(asset, id);
        self
    }

    /// Pin the id a hex pool id resolves to.
    pub fn with_pool_id(mut self, pool_id: &str, id: i64) -> Self {
        self.inner.get_mut().pools.seed(pool_id, id);
        self
    }

    /// Rows written so far, in insertion order.
    pub async fn trades(&self) -> Vec<TradeRow> {
        self.inner.lock().await.trades.clone()
    }
}

#[async_trait]
impl TradeStore for MemoryStore {
    async fn resolve_accounts(
        &self,
        addresses: &[String],
        _batch_size: usize,
    ) -> Result<HashMap<String, i64>, StoreError> {
        Ok(self.inner.lock().await.accounts.resolve(addresses))
    }

    async fn resolve_assets(
        &self,
        assets: &[String],
        _batch_size: usize,
    ) -> Result<HashMap<String, i64>, StoreError> {
        Ok(self.inner.lock().await.assets.resolve(assets))
    }

    async fn resolve_pools(
        &self,
        pool_ids: &[String],
        _batch_size: usize,
    ) -> Result<HashMap<String, i64>, StoreError> {
        Ok(self.inner.lock().await.pools.resolve(pool_ids))
    }

    async fn insert_trades(&self, rows: &[TradeRow]) -> Result<(), StoreError> {
        self.inner.lock().await.trades.extend_from_slice(rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ids_are_stable_across_calls() {
        let store = MemoryStore::new();
        let keys = vec!["GA".to_string(), "GB".to_string()];
        let first = store.resolve_accounts(&keys, 10).await.unwrap();
        let second = store.resolve_accounts(&keys, 10).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_seeded_ids_are_honored() {
        let store = MemoryStore::new().with_asset_id("native", 9);
        let keys = vec!["native".to_string(), "USD:G".to_string()];
        let ids = store.resolve_assets(&keys, 10).await.unwrap();
        assert_eq!(ids["native"], 9);
        // Fresh allocations never collide with seeded ids.
        assert_eq!(ids["USD:G"], 10);
    }

    #[tokio::test]
    async fn test_tables_are_independent() {
        let store = MemoryStore::new();
        let accounts = store
            .resolve_accounts(&["GA".to_string()], 10)
            .await
            .unwrap();
        let assets = store
            .resolve_assets(&["native".to_string()], 10)
            .await
            .unwrap();
        assert_eq!(accounts["GA"], 1);
        assert_eq!(assets["native"], 1);
    }
}
