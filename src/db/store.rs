//! Persistence seam for entity resolution and trade batches.

use crate::domain::TradeRow;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Store abstraction the trade pipeline writes through.
///
/// The `resolve_*` calls allocate ids for any references not yet known
/// (create-if-absent) and return the full requested mapping; requests are
/// chunked by `batch_size`. `insert_trades` writes a ledger's rows
/// atomically.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Map account addresses to history account ids.
    async fn resolve_accounts(
        &self,
        addresses: &[String],
        batch_size: usize,
    ) -> Result<HashMap<String, i64>, StoreError>;

    /// Map canonical asset strings to history asset ids.
    async fn resolve_assets(
        &self,
        assets: &[String],
        batch_size: usize,
    ) -> Result<HashMap<String, i64>, StoreError>;

    /// Map hex pool ids to history liquidity pool ids.
    async fn resolve_pools(
        &self,
        pool_ids: &[String],
        batch_size: usize,
    ) -> Result<HashMap<String, i64>, StoreError>;

    /// Insert all rows in one transaction; either every row lands or none.
    async fn insert_trades(&self, rows: &[TradeRow]) -> Result<(), StoreError>;
}

/// Error from a store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Other(String),
}
