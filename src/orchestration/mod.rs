//! Orchestration of the per-ledger ingestion pipeline.

pub mod ingest;

pub use ingest::{IngestionResult, LedgerIngestor};
