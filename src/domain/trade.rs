//! Normalized trade rows staged for batch persistence.

use crate::domain::asset::Asset;
use crate::domain::primitives::{AccountAddress, PoolId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fully normalized trade row as persisted to `history_trades`.
///
/// After commit the base asset id is always the smaller of the pair; when
/// the raw orientation had to be flipped to satisfy this, every paired
/// field was swapped together and `base_is_seller` cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRow {
    pub history_operation_id: i64,
    /// 1-based position among the operation's claim atoms.
    pub trade_order: i32,
    pub ledger_closed_at: DateTime<Utc>,
    pub base_amount: i64,
    pub counter_amount: i64,
    pub base_asset_id: i64,
    pub counter_asset_id: i64,
    pub base_account_id: Option<i64>,
    pub counter_account_id: Option<i64>,
    pub base_liquidity_pool_id: Option<i64>,
    pub counter_liquidity_pool_id: Option<i64>,
    pub base_offer_id: Option<i64>,
    pub counter_offer_id: Option<i64>,
    pub liquidity_pool_fee: Option<i64>,
    pub price_n: i64,
    pub price_d: i64,
    pub base_is_seller: bool,
}

/// A staged trade awaiting id resolution and canonical ordering.
///
/// Until commit, base is the sold side and counter the bought side; the
/// asset-id comparison at commit time decides the final orientation, so
/// the row's id fields stay zero until then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTrade {
    pub row: TradeRow,
    /// Selling counterparty; None for pool fills.
    pub seller: Option<AccountAddress>,
    /// Pool counterparty; None for order-book fills.
    pub pool_id: Option<PoolId>,
    pub buyer: AccountAddress,
    pub sold_asset: Asset,
    pub bought_asset: Asset,
}
