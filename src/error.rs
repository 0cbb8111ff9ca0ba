use crate::db::StoreError;
use crate::domain::OperationKind;
use thiserror::Error;

/// Errors raised while extracting, normalizing or committing a ledger's
/// trades.
///
/// Every variant aborts the in-progress ledger as a unit; a ledger's
/// trades are never partially persisted.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A successful transaction carried no per-operation results.
    #[error("transaction {tx_index} has no operation results")]
    MissingOperationResults { tx_index: u32 },
    /// The decoded result arm does not fit the operation that produced it.
    #[error("result arm does not match operation kind {kind:?}")]
    UnexpectedResultArm { kind: OperationKind },
    /// No state change with a matching before-state was recorded for the
    /// operation. The referenced offer or pool is expected to exist in
    /// ledger state, so this is a data invariant violation.
    #[error("no state change found for {0}")]
    ChangeNotFound(String),
    #[error("could not find history account id for {0}")]
    UnresolvedAccount(String),
    #[error("could not find history asset id for {0}")]
    UnresolvedAsset(String),
    #[error("could not find history liquidity pool id for {0}")]
    UnresolvedPool(String),
    /// Store failure, propagated verbatim; retry policy belongs to the
    /// caller.
    #[error(transparent)]
    Store(#[from] StoreError),
}
