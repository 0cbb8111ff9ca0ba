//! Ledger entry snapshots and per-operation state changes.
//!
//! Results omit the executed price of order-book fills and the fee charged
//! by pools; both are recovered from the `pre` snapshot of the entry that
//! was consumed by the trade (see engine::changes).

use crate::domain::asset::Asset;
use crate::domain::primitives::{AccountAddress, PoolId, Price};
use serde::{Deserialize, Serialize};

/// Identity of a ledger entry, used to match state changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerKey {
    Account {
        account: AccountAddress,
    },
    Offer {
        seller: AccountAddress,
        offer_id: i64,
    },
    LiquidityPool {
        pool_id: PoolId,
    },
}

impl std::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerKey::Account { account } => write!(f, "account {}", account),
            LedgerKey::Offer { seller, offer_id } => {
                write!(f, "offer {} of {}", offer_id, seller)
            }
            LedgerKey::LiquidityPool { pool_id } => write!(f, "liquidity pool {}", pool_id),
        }
    }
}

/// A minimal account entry; carried in change lists alongside the entries
/// the pipeline actually reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub account: AccountAddress,
    pub balance: i64,
}

/// A resting order-book offer as stored in ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferEntry {
    pub seller: AccountAddress,
    pub offer_id: i64,
    pub selling: Asset,
    pub buying: Asset,
    /// Remaining amount of the selling asset.
    pub amount: i64,
    pub price: Price,
}

/// Constant-product pool parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantProductParams {
    pub asset_a: Asset,
    pub asset_b: Asset,
    /// Pool fee in basis points.
    pub fee_bps: i32,
}

/// A constant-product liquidity pool as stored in ledger state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityPoolEntry {
    pub pool_id: PoolId,
    pub params: ConstantProductParams,
    pub reserve_a: i64,
    pub reserve_b: i64,
    pub total_shares: i64,
}

/// Entry payload of a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEntryData {
    Account(AccountEntry),
    Offer(OfferEntry),
    LiquidityPool(LiquidityPoolEntry),
}

impl LedgerEntryData {
    /// The key identifying this entry in ledger state.
    pub fn key(&self) -> LedgerKey {
        match self {
            LedgerEntryData::Account(entry) => LedgerKey::Account {
                account: entry.account.clone(),
            },
            LedgerEntryData::Offer(entry) => LedgerKey::Offer {
                seller: entry.seller.clone(),
                offer_id: entry.offer_id,
            },
            LedgerEntryData::LiquidityPool(entry) => LedgerKey::LiquidityPool {
                pool_id: entry.pool_id,
            },
        }
    }
}

/// One before/after entry state transition recorded for an operation.
///
/// `pre` is None for created entries, `post` is None for removed ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub pre: Option<LedgerEntryData>,
    pub post: Option<LedgerEntryData>,
}
