//! Transaction, operation and result-union shapes as handed over by the
//! wire-format codec.

use crate::domain::asset::Asset;
use crate::domain::entry::{Change, OfferEntry};
use crate::domain::primitives::{AccountAddress, PoolId};
use serde::{Deserialize, Serialize};

/// Immutable per-ledger context: sequence number and consensus close time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerHeader {
    pub sequence: u32,
    /// Consensus close time, unix seconds.
    pub close_time: i64,
}

/// Operation kinds the pipeline distinguishes.
///
/// Kinds that cannot produce claim atoms are still representable so a
/// driver can hand over whole transactions unfiltered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    CreateAccount,
    Payment,
    PathPaymentStrictReceive,
    PathPaymentStrictSend,
    ManageSellOffer,
    ManageBuyOffer,
    CreatePassiveSellOffer,
    ChangeTrust,
    LiquidityPoolDeposit,
    LiquidityPoolWithdraw,
}

/// One operation within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Per-operation source override; falls back to the transaction source.
    pub source: Option<AccountAddress>,
    pub kind: OperationKind,
}

/// A fill against a resting order-book offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimOfferAtom {
    pub seller: AccountAddress,
    pub offer_id: i64,
    pub asset_sold: Asset,
    pub amount_sold: i64,
    pub asset_bought: Asset,
    pub amount_bought: i64,
}

/// A fill against a liquidity pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPoolAtom {
    pub pool_id: PoolId,
    pub asset_sold: Asset,
    pub amount_sold: i64,
    pub asset_bought: Asset,
    pub amount_bought: i64,
}

/// A single counterparty fill recorded in an operation's result.
///
/// Amounts are from the counterparty's perspective: `sold` is what the
/// offer or pool gave up, `bought` what it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimAtom {
    OrderBook(ClaimOfferAtom),
    LiquidityPool(ClaimPoolAtom),
}

impl ClaimAtom {
    pub fn amount_sold(&self) -> i64 {
        match self {
            ClaimAtom::OrderBook(atom) => atom.amount_sold,
            ClaimAtom::LiquidityPool(atom) => atom.amount_sold,
        }
    }

    pub fn amount_bought(&self) -> i64 {
        match self {
            ClaimAtom::OrderBook(atom) => atom.amount_bought,
            ClaimAtom::LiquidityPool(atom) => atom.amount_bought,
        }
    }

    pub fn asset_sold(&self) -> &Asset {
        match self {
            ClaimAtom::OrderBook(atom) => &atom.asset_sold,
            ClaimAtom::LiquidityPool(atom) => &atom.asset_sold,
        }
    }

    pub fn asset_bought(&self) -> &Asset {
        match self {
            ClaimAtom::OrderBook(atom) => &atom.asset_bought,
            ClaimAtom::LiquidityPool(atom) => &atom.asset_bought,
        }
    }

    /// True when both amounts are zero: a garbage-collected offer emitted
    /// in the result, not a real trade.
    pub fn is_garbage_collected(&self) -> bool {
        self.amount_sold() == 0 && self.amount_bought() == 0
    }
}

/// Success payload of a path payment result: the offers claimed along the
/// path, in matching order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPaymentSuccess {
    pub claims: Vec<ClaimAtom>,
}

/// Success payload of a manage-offer style result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManageOfferSuccess {
    pub claims: Vec<ClaimAtom>,
    /// The resting offer left in the book after matching, if any.
    pub offer: Option<OfferEntry>,
}

/// Per-operation result union.
///
/// The discriminant reflects the arm actually present in the decoded
/// result. For create-passive-sell-offer operations the consensus engine
/// sometimes emits the manage-sell-offer arm instead of the nominal one;
/// extraction dispatches on this discriminant, not on the operation kind
/// alone (see engine::extractor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationResult {
    PathPaymentStrictReceive(PathPaymentSuccess),
    PathPaymentStrictSend(PathPaymentSuccess),
    ManageSellOffer(ManageOfferSuccess),
    ManageBuyOffer(ManageOfferSuccess),
    CreatePassiveSellOffer(ManageOfferSuccess),
    /// Result arm for kinds that never produce trades.
    Other,
}

/// Outcome of a transaction as computed by consensus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub successful: bool,
    /// Per-operation results; None when the result omitted them.
    pub results: Option<Vec<OperationResult>>,
}

/// One ledger transaction with everything extraction needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// 1-based position within the ledger.
    pub index: u32,
    pub source: AccountAddress,
    pub operations: Vec<Operation>,
    pub result: TransactionResult,
    /// Ordered before/after entry changes, one list per operation.
    pub changes: Vec<Vec<Change>>,
}

impl Transaction {
    /// The ordered change list of one operation, if recorded.
    pub fn operation_changes(&self, op_index: usize) -> Option<&[Change]> {
        self.changes.get(op_index).map(|changes| changes.as_slice())
    }
}
