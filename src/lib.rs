pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;

pub use config::Config;
pub use db::{init_db, MemoryStore, Repository, StoreError, TradeStore};
pub use domain::{
    AccountAddress, Asset, Change, ClaimAtom, LedgerEntryData, LedgerHeader, LedgerKey, Operation,
    OperationKind, OperationResult, PendingTrade, PoolId, Price, TradeRow, Transaction,
    TransactionResult,
};
pub use engine::TradeProcessor;
pub use error::IngestError;
pub use orchestration::{IngestionResult, LedgerIngestor};
