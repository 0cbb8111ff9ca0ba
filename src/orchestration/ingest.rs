use crate::config::Config;
use crate::db::TradeStore;
use crate::domain::{LedgerHeader, Transaction};
use crate::engine::TradeProcessor;
use crate::error::IngestError;
use std::sync::Arc;

/// Drives one ledger close at a time through extraction, staging and
/// commit.
#[derive(Clone)]
pub struct LedgerIngestor {
    store: Arc<dyn TradeStore>,
    resolve_batch_size: usize,
}

impl LedgerIngestor {
    pub fn new(store: Arc<dyn TradeStore>, config: &Config) -> Self {
        Self {
            store,
            resolve_batch_size: config.resolve_batch_size,
        }
    }

    /// Ingest every trade of one ledger close.
    ///
    /// Transactions are processed strictly in ledger order; the commit is
    /// all-or-nothing, so an error leaves the store without any of this
    /// ledger's trades.
    pub async fn ingest_ledger(
        &self,
        ledger: &LedgerHeader,
        transactions: &[Transaction],
    ) -> Result<IngestionResult, IngestError> {
        let mut processor = TradeProcessor::new(*ledger);
        for tx in transactions {
            processor.process_transaction(tx)?;
            tracing::debug!(
                ledger = ledger.sequence,
                tx_index = tx.index,
                staged = processor.staged(),
                "transaction processed"
            );
        }

        let trades_stored = processor
            .commit(self.store.as_ref(), self.resolve_batch_size)
            .await?;

        tracing::info!(
            ledger = ledger.sequence,
            trades = trades_stored,
            "ledger trades committed"
        );

        Ok(IngestionResult {
            ledger_sequence: ledger.sequence,
            trades_stored,
        })
    }
}

/// Outcome of one ledger ingestion.
#[derive(Debug)]
pub struct IngestionResult {
    pub ledger_sequence: u32,
    pub trades_stored: usize,
}
