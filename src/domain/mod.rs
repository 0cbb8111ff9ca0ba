//! Decoded ledger data model and normalized trade types.
//!
//! This module provides:
//! - Domain primitives: AccountAddress, PoolId, Price
//! - Asset with its canonical string form used as a resolution key
//! - Transaction, operation and result-union shapes handed over by the codec
//! - Ledger entry snapshots and per-operation state changes
//! - The normalized trade row and the packed history operation id

pub mod asset;
pub mod entry;
pub mod ledger;
pub mod opid;
pub mod primitives;
pub mod trade;

pub use asset::Asset;
pub use entry::{
    AccountEntry, Change, ConstantProductParams, LedgerEntryData, LedgerKey, LiquidityPoolEntry,
    OfferEntry,
};
pub use ledger::{
    ClaimAtom, ClaimOfferAtom, ClaimPoolAtom, LedgerHeader, ManageOfferSuccess, Operation,
    OperationKind, OperationResult, PathPaymentSuccess, Transaction, TransactionResult,
};
pub use opid::history_operation_id;
pub use primitives::{AccountAddress, PoolId, Price};
pub use trade::{PendingTrade, TradeRow};
