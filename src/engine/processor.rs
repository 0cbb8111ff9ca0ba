//! Per-ledger trade accumulation and batched persistence.

use crate::db::TradeStore;
use crate::domain::{LedgerHeader, PendingTrade, TradeRow, Transaction};
use crate::engine::extractor::extract_trades;
use crate::error::IngestError;
use std::collections::BTreeSet;

/// Accumulates a ledger's trades and commits them in one batch.
///
/// One processor serves exactly one ledger close; the caller owns it and
/// drops it after commit, so independent ledgers can be pipelined with
/// independent processors.
pub struct TradeProcessor {
    ledger: LedgerHeader,
    pending: Vec<PendingTrade>,
}

impl TradeProcessor {
    pub fn new(ledger: LedgerHeader) -> Self {
        Self {
            ledger,
            pending: Vec::new(),
        }
    }

    /// Number of trades staged so far.
    pub fn staged(&self) -> usize {
        self.pending.len()
    }

    /// Extract and stage all trades of one transaction.
    ///
    /// Failed transactions cause no ledger effects and are skipped.
    pub fn process_transaction(&mut self, tx: &Transaction) -> Result<(), IngestError> {
        if !tx.result.successful {
            return Ok(());
        }

        let trades = extract_trades(&self.ledger, tx)?;
        self.pending.extend(trades);
        Ok(())
    }

    /// Resolve every referenced entity, fix the canonical orientation and
    /// write all staged rows in one batch.
    ///
    /// The whole ledger commits or nothing does: an unresolved entity or a
    /// store failure rejects every staged trade. Returns the number of rows
    /// handed to the store.
    pub async fn commit(
        &mut self,
        store: &dyn TradeStore,
        batch_size: usize,
    ) -> Result<usize, IngestError> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let mut accounts = BTreeSet::new();
        let mut assets = BTreeSet::new();
        let mut pools = BTreeSet::new();
        for trade in &self.pending {
            accounts.insert(trade.buyer.as_str().to_string());
            if let Some(seller) = &trade.seller {
                accounts.insert(seller.as_str().to_string());
            }
            if let Some(pool_id) = &trade.pool_id {
                pools.insert(pool_id.to_hex());
            }
            assets.insert(trade.sold_asset.canonical());
            assets.insert(trade.bought_asset.canonical());
        }

        let accounts: Vec<String> = accounts.into_iter().collect();
        let assets: Vec<String> = assets.into_iter().collect();
        let pools: Vec<String> = pools.into_iter().collect();

        let account_ids = store.resolve_accounts(&accounts, batch_size).await?;
        let asset_ids = store.resolve_assets(&assets, batch_size).await?;
        let pool_ids = store.resolve_pools(&pools, batch_size).await?;

        let mut rows = Vec::with_capacity(self.pending.len());
        for trade in &self.pending {
            let mut row = trade.row.clone();

            if let Some(seller) = &trade.seller {
                let id = account_ids
                    .get(seller.as_str())
                    .ok_or_else(|| IngestError::UnresolvedAccount(seller.as_str().to_string()))?;
                row.base_account_id = Some(*id);
            }
            let buyer_id = account_ids
                .get(trade.buyer.as_str())
                .ok_or_else(|| IngestError::UnresolvedAccount(trade.buyer.as_str().to_string()))?;
            row.counter_account_id = Some(*buyer_id);

            if let Some(pool_id) = &trade.pool_id {
                let hex = pool_id.to_hex();
                let id = pool_ids
                    .get(&hex)
                    .ok_or(IngestError::UnresolvedPool(hex))?;
                row.base_liquidity_pool_id = Some(*id);
            }

            let sold = trade.sold_asset.canonical();
            row.base_asset_id = *asset_ids
                .get(&sold)
                .ok_or(IngestError::UnresolvedAsset(sold))?;
            let bought = trade.bought_asset.canonical();
            row.counter_asset_id = *asset_ids
                .get(&bought)
                .ok_or(IngestError::UnresolvedAsset(bought))?;

            reorient(&mut row);
            rows.push(row);
        }

        store.insert_trades(&rows).await?;
        let stored = rows.len();
        self.pending.clear();
        Ok(stored)
    }
}

/// Enforce the canonical orientation: the base asset id is always the
/// smaller of the pair. Flipping swaps every paired field together and
/// clears `base_is_seller`, so the original seller's perspective stays
/// recoverable.
fn reorient(row: &mut TradeRow) {
    if row.base_asset_id <= row.counter_asset_id {
        return;
    }

    row.base_is_seller = false;
    std::mem::swap(&mut row.base_asset_id, &mut row.counter_asset_id);
    std::mem::swap(&mut row.base_amount, &mut row.counter_amount);
    std::mem::swap(&mut row.base_account_id, &mut row.counter_account_id);
    std::mem::swap(
        &mut row.base_liquidity_pool_id,
        &mut row.counter_liquidity_pool_id,
    );
    std::mem::swap(&mut row.base_offer_id, &mut row.counter_offer_id);
    std::mem::swap(&mut row.price_n, &mut row.price_d);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, StoreError};
    use crate::domain::{
        AccountAddress, Asset, Change, ClaimAtom, ClaimOfferAtom, LedgerEntryData,
        ManageOfferSuccess, OfferEntry, Operation, OperationKind, OperationResult, Price,
        TransactionResult,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn ledger() -> LedgerHeader {
        LedgerHeader {
            sequence: 100,
            close_time: 1_700_000_000,
        }
    }

    fn sell_offer_tx(index: u32, sold: i64, bought: i64) -> Transaction {
        Transaction {
            index,
            source: AccountAddress::new("GBUYER"),
            operations: vec![Operation {
                source: None,
                kind: OperationKind::ManageSellOffer,
            }],
            result: TransactionResult {
                successful: true,
                results: Some(vec![OperationResult::ManageSellOffer(ManageOfferSuccess {
                    claims: vec![ClaimAtom::OrderBook(ClaimOfferAtom {
                        seller: AccountAddress::new("GSELLER"),
                        offer_id: 7,
                        asset_sold: Asset::Native,
                        amount_sold: sold,
                        asset_bought: Asset::credit("USD", "GISSUER"),
                        amount_bought: bought,
                    })],
                    offer: None,
                })]),
            },
            changes: vec![vec![Change {
                pre: Some(LedgerEntryData::Offer(OfferEntry {
                    seller: AccountAddress::new("GSELLER"),
                    offer_id: 7,
                    selling: Asset::Native,
                    buying: Asset::credit("USD", "GISSUER"),
                    amount: 10_000,
                    price: Price::new(1, 2),
                })),
                post: None,
            }]],
        }
    }

    #[tokio::test]
    async fn test_failed_transactions_are_skipped() {
        let mut tx = sell_offer_tx(1, 1000, 500);
        tx.result.successful = false;

        let mut processor = TradeProcessor::new(ledger());
        processor.process_transaction(&tx).unwrap();
        assert_eq!(processor.staged(), 0);

        let store = MemoryStore::new();
        assert_eq!(processor.commit(&store, 1000).await.unwrap(), 0);
        assert!(store.trades().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_swap_when_base_id_is_smaller() {
        let store = MemoryStore::new()
            .with_asset_id("native", 3)
            .with_asset_id("USD:GISSUER", 9)
            .with_account_id("GSELLER", 7)
            .with_account_id("GBUYER", 8);

        let mut processor = TradeProcessor::new(ledger());
        processor
            .process_transaction(&sell_offer_tx(1, 1000, 500))
            .unwrap();
        assert_eq!(processor.commit(&store, 1000).await.unwrap(), 1);

        let rows = store.trades().await;
        let row = &rows[0];
        assert_eq!(row.base_asset_id, 3);
        assert_eq!(row.counter_asset_id, 9);
        assert_eq!(row.base_amount, 1000);
        assert_eq!(row.counter_amount, 500);
        assert_eq!(row.base_account_id, Some(7));
        assert_eq!(row.counter_account_id, Some(8));
        assert_eq!((row.price_n, row.price_d), (1, 2));
        assert!(row.base_is_seller);
    }

    #[tokio::test]
    async fn test_swap_when_base_id_is_larger() {
        let store = MemoryStore::new()
            .with_asset_id("native", 9)
            .with_asset_id("USD:GISSUER", 3)
            .with_account_id("GSELLER", 7)
            .with_account_id("GBUYER", 8);

        let mut processor = TradeProcessor::new(ledger());
        processor
            .process_transaction(&sell_offer_tx(1, 1000, 500))
            .unwrap();
        processor.commit(&store, 1000).await.unwrap();

        let rows = store.trades().await;
        let row = &rows[0];
        // Everything paired swapped together, seller now on the counter side.
        assert_eq!(row.base_asset_id, 3);
        assert_eq!(row.counter_asset_id, 9);
        assert_eq!(row.base_amount, 500);
        assert_eq!(row.counter_amount, 1000);
        assert_eq!(row.base_account_id, Some(8));
        assert_eq!(row.counter_account_id, Some(7));
        assert_eq!(row.base_offer_id, None);
        assert_eq!(row.counter_offer_id, Some(7));
        assert_eq!((row.price_n, row.price_d), (2, 1));
        assert!(!row.base_is_seller);
    }

    #[tokio::test]
    async fn test_commit_clears_staged_trades() {
        let store = MemoryStore::new();
        let mut processor = TradeProcessor::new(ledger());
        processor
            .process_transaction(&sell_offer_tx(1, 1000, 500))
            .unwrap();
        assert_eq!(processor.staged(), 1);
        processor.commit(&store, 1000).await.unwrap();
        assert_eq!(processor.staged(), 0);

        // A second commit writes nothing further.
        assert_eq!(processor.commit(&store, 1000).await.unwrap(), 0);
        assert_eq!(store.trades().await.len(), 1);
    }

    /// Store that resolves nothing, for exercising referential-integrity
    /// failures.
    struct EmptyStore;

    #[async_trait]
    impl TradeStore for EmptyStore {
        async fn resolve_accounts(
            &self,
            _addresses: &[String],
            _batch_size: usize,
        ) -> Result<HashMap<String, i64>, StoreError> {
            Ok(HashMap::new())
        }

        async fn resolve_assets(
            &self,
            _assets: &[String],
            _batch_size: usize,
        ) -> Result<HashMap<String, i64>, StoreError> {
            Ok(HashMap::new())
        }

        async fn resolve_pools(
            &self,
            _pool_ids: &[String],
            _batch_size: usize,
        ) -> Result<HashMap<String, i64>, StoreError> {
            Ok(HashMap::new())
        }

        async fn insert_trades(&self, _rows: &[TradeRow]) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_unresolved_account_aborts_commit() {
        let mut processor = TradeProcessor::new(ledger());
        processor
            .process_transaction(&sell_offer_tx(1, 1000, 500))
            .unwrap();
        let err = processor.commit(&EmptyStore, 1000).await.unwrap_err();
        assert!(matches!(err, IngestError::UnresolvedAccount(_)));
        // Pending trades survive an aborted commit.
        assert_eq!(processor.staged(), 1);
    }
}
