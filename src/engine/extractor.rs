//! Extraction of claimed trades from operation results.

use crate::domain::{
    history_operation_id, ClaimAtom, LedgerHeader, OfferEntry, OperationKind, OperationResult,
    PendingTrade, TradeRow, Transaction,
};
use crate::engine::changes::{pool_fee, trade_sell_price};
use crate::error::IngestError;
use chrono::DateTime;

/// Extract every trade a successful transaction caused, in declaration
/// order.
///
/// Returns staged, raw-oriented trades: base is the sold side until ids
/// are resolved at commit time.
pub fn extract_trades(
    ledger: &LedgerHeader,
    tx: &Transaction,
) -> Result<Vec<PendingTrade>, IngestError> {
    let mut out = Vec::new();
    let closed_at = DateTime::from_timestamp(ledger.close_time, 0).unwrap_or_default();

    let results = match &tx.result.results {
        Some(results) => results,
        None => return Err(IngestError::MissingOperationResults { tx_index: tx.index }),
    };

    for (op_index, op) in tx.operations.iter().enumerate() {
        let result = results
            .get(op_index)
            .ok_or(IngestError::MissingOperationResults { tx_index: tx.index })?;

        let (claims, resting_offer) = match claimed_offers(op.kind, result)? {
            Some(extracted) => extracted,
            None => continue,
        };

        let op_id = history_operation_id(ledger.sequence, tx.index, op_index as u32 + 1);
        for (claim_index, claim) in claims.iter().enumerate() {
            // Garbage-collected offers surface in results with both
            // amounts zeroed; they are not trades.
            if claim.is_garbage_collected() {
                continue;
            }

            let (price_n, price_d) = trade_sell_price(tx, op_index, claim)?;

            let mut row = TradeRow {
                history_operation_id: op_id,
                trade_order: claim_index as i32 + 1,
                ledger_closed_at: closed_at,
                base_amount: claim.amount_sold(),
                counter_amount: claim.amount_bought(),
                base_asset_id: 0,
                counter_asset_id: 0,
                base_account_id: None,
                counter_account_id: None,
                base_liquidity_pool_id: None,
                counter_liquidity_pool_id: None,
                base_offer_id: None,
                counter_offer_id: None,
                liquidity_pool_fee: None,
                price_n,
                price_d,
                base_is_seller: true,
            };

            let mut seller = None;
            let mut pool_id = None;
            match claim {
                ClaimAtom::LiquidityPool(atom) => {
                    row.liquidity_pool_fee = Some(pool_fee(tx, op_index, atom.pool_id)?);
                    pool_id = Some(atom.pool_id);
                }
                ClaimAtom::OrderBook(atom) => {
                    row.base_offer_id = Some(atom.offer_id);
                    seller = Some(atom.seller.clone());
                }
            }

            if let Some(offer) = resting_offer {
                row.counter_offer_id = Some(offer.offer_id);
            }

            let buyer = op.source.clone().unwrap_or_else(|| tx.source.clone());

            out.push(PendingTrade {
                row,
                seller,
                pool_id,
                buyer,
                sold_asset: claim.asset_sold().clone(),
                bought_asset: claim.asset_bought().clone(),
            });
        }
    }

    Ok(out)
}

/// Claim atoms and optional resting offer for one operation, read from
/// the result arm that is actually present.
///
/// Returns None for operation kinds that never produce trades.
fn claimed_offers<'a>(
    kind: OperationKind,
    result: &'a OperationResult,
) -> Result<Option<(&'a [ClaimAtom], Option<&'a OfferEntry>)>, IngestError> {
    match kind {
        OperationKind::PathPaymentStrictReceive => match result {
            OperationResult::PathPaymentStrictReceive(success) => {
                Ok(Some((&success.claims, None)))
            }
            _ => Err(IngestError::UnexpectedResultArm { kind }),
        },
        OperationKind::PathPaymentStrictSend => match result {
            OperationResult::PathPaymentStrictSend(success) => Ok(Some((&success.claims, None))),
            _ => Err(IngestError::UnexpectedResultArm { kind }),
        },
        OperationKind::ManageSellOffer => match result {
            OperationResult::ManageSellOffer(success) => {
                Ok(Some((&success.claims, success.offer.as_ref())))
            }
            _ => Err(IngestError::UnexpectedResultArm { kind }),
        },
        OperationKind::ManageBuyOffer => match result {
            OperationResult::ManageBuyOffer(success) => {
                Ok(Some((&success.claims, success.offer.as_ref())))
            }
            _ => Err(IngestError::UnexpectedResultArm { kind }),
        },
        // The consensus engine sometimes labels a passive offer's result
        // with the manage-sell-offer arm; both shapes are valid here.
        OperationKind::CreatePassiveSellOffer => match result {
            OperationResult::CreatePassiveSellOffer(success)
            | OperationResult::ManageSellOffer(success) => {
                Ok(Some((&success.claims, success.offer.as_ref())))
            }
            _ => Err(IngestError::UnexpectedResultArm { kind }),
        },
        _ => Ok(None),
    }
}
