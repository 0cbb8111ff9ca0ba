//! Packed history operation ids.
//!
//! A history operation id totally orders every operation across the ledger
//! chain: ledger-major, transaction-next, operation-minor. The packing is
//! `ledger << 32 | transaction << 12 | operation`, which leaves room for
//! 2^20 transactions per ledger and 2^12 operations per transaction.

const TX_BITS: u32 = 20;
const OP_BITS: u32 = 12;

/// Pack (ledger sequence, transaction index, operation index) into an i64.
///
/// `tx_index` is 1-based within the ledger and `op_index` 1-based within
/// the transaction; id 0 of either level addresses the level itself.
pub fn history_operation_id(ledger_sequence: u32, tx_index: u32, op_index: u32) -> i64 {
    debug_assert!(tx_index < (1 << TX_BITS));
    debug_assert!(op_index < (1 << OP_BITS));

    ((ledger_sequence as i64) << (TX_BITS + OP_BITS))
        | ((tx_index as i64) << OP_BITS)
        | (op_index as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_packing() {
        // ledger 1, tx 1, op 1 = 2^32 + 2^12 + 1
        assert_eq!(history_operation_id(1, 1, 1), 4_294_971_393);
    }

    #[test]
    fn test_zero_indices_address_the_ledger() {
        assert_eq!(history_operation_id(7, 0, 0), 7i64 << 32);
    }

    #[test]
    fn test_operation_minor_ordering() {
        assert!(history_operation_id(5, 3, 1) < history_operation_id(5, 3, 2));
    }

    #[test]
    fn test_transaction_next_ordering() {
        // Any operation of tx 3 sorts before any operation of tx 4.
        assert!(history_operation_id(5, 3, 4095) < history_operation_id(5, 4, 1));
    }

    #[test]
    fn test_ledger_major_ordering() {
        assert!(history_operation_id(5, 1_048_575, 4095) < history_operation_id(6, 1, 1));
    }
}
