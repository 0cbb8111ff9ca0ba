//! Pure extraction and normalization logic for claimed trades.

pub mod changes;
pub mod extractor;
pub mod processor;

pub use changes::find_operation_change;
pub use extractor::extract_trades;
pub use processor::TradeProcessor;
