//! Recovery of prices and fees from per-operation ledger state changes.

use crate::domain::{Change, ClaimAtom, LedgerEntryData, LedgerKey, PoolId, Transaction};
use crate::error::IngestError;

/// Find the most recent change whose `pre` state matches `key`.
///
/// The change list is scanned newest-first: an entry may be touched more
/// than once within one operation (partially filled, then removed), and
/// the latest matching `pre` snapshot holds the entry's state at the
/// moment of the trade.
pub fn find_operation_change<'a>(
    tx: &'a Transaction,
    op_index: usize,
    key: &LedgerKey,
) -> Result<&'a Change, IngestError> {
    let changes = tx
        .operation_changes(op_index)
        .ok_or_else(|| IngestError::ChangeNotFound(key.to_string()))?;

    for change in changes.iter().rev() {
        if let Some(pre) = &change.pre {
            if &pre.key() == key {
                return Ok(change);
            }
        }
    }
    Err(IngestError::ChangeNotFound(key.to_string()))
}

/// Executed sell price for a claim, as a (numerator, denominator) pair.
///
/// Pool fills carry their price implicitly in the exchanged amounts. For
/// order-book fills the result omits the price, so it is read off the
/// resting offer's state just before the fill.
pub fn trade_sell_price(
    tx: &Transaction,
    op_index: usize,
    claim: &ClaimAtom,
) -> Result<(i64, i64), IngestError> {
    let (seller, offer_id) = match claim {
        ClaimAtom::LiquidityPool(atom) => return Ok((atom.amount_bought, atom.amount_sold)),
        ClaimAtom::OrderBook(atom) => (atom.seller.clone(), atom.offer_id),
    };

    let key = LedgerKey::Offer { seller, offer_id };
    let change = find_operation_change(tx, op_index, &key)?;
    match change.pre.as_ref() {
        Some(LedgerEntryData::Offer(entry)) => Ok((entry.price.n as i64, entry.price.d as i64)),
        _ => Err(IngestError::ChangeNotFound(key.to_string())),
    }
}

/// Fee in basis points charged by the pool at the moment of the trade.
pub fn pool_fee(tx: &Transaction, op_index: usize, pool_id: PoolId) -> Result<i64, IngestError> {
    let key = LedgerKey::LiquidityPool { pool_id };
    let change = find_operation_change(tx, op_index, &key)?;
    match change.pre.as_ref() {
        Some(LedgerEntryData::LiquidityPool(entry)) => Ok(entry.params.fee_bps as i64),
        _ => Err(IngestError::ChangeNotFound(key.to_string())),
    }
}
