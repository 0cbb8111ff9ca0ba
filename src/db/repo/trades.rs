//! Entity id allocation and trade batch writes.

use crate::db::store::{StoreError, TradeStore};
use crate::domain::{history_operation_id, TradeRow};
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::Row;
use std::collections::HashMap;

use super::Repository;

impl Repository {
    /// Allocate ids for `keys` in `table`, create-if-absent, chunked.
    async fn resolve_in(
        &self,
        table: &str,
        column: &str,
        keys: &[String],
        batch_size: usize,
    ) -> Result<HashMap<String, i64>, StoreError> {
        let mut out = HashMap::with_capacity(keys.len());
        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES (?) ON CONFLICT({}) DO NOTHING",
            table, column, column
        );
        let select_sql = format!("SELECT id FROM {} WHERE {} = ?", table, column);

        for chunk in keys.chunks(batch_size.max(1)) {
            let mut tx = self.pool().begin().await?;
            for key in chunk {
                sqlx::query(&insert_sql).bind(key).execute(&mut *tx).await?;
            }
            tx.commit().await?;

            for key in chunk {
                let row = sqlx::query(&select_sql)
                    .bind(key)
                    .fetch_one(self.pool())
                    .await?;
                out.insert(key.clone(), row.get::<i64, _>("id"));
            }
        }

        Ok(out)
    }

    /// Query the trades of one ledger in commit order.
    pub async fn trades_for_ledger(
        &self,
        ledger_sequence: u32,
    ) -> Result<Vec<TradeRow>, StoreError> {
        let start = history_operation_id(ledger_sequence, 0, 0);
        let end = history_operation_id(ledger_sequence + 1, 0, 0);

        let rows = sqlx::query(
            r#"
            SELECT history_operation_id, trade_order, ledger_closed_at,
                   base_amount, counter_amount, base_asset_id, counter_asset_id,
                   base_account_id, counter_account_id,
                   base_liquidity_pool_id, counter_liquidity_pool_id,
                   base_offer_id, counter_offer_id, liquidity_pool_fee,
                   price_n, price_d, base_is_seller
            FROM history_trades
            WHERE history_operation_id >= ? AND history_operation_id < ?
            ORDER BY history_operation_id ASC, trade_order ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| TradeRow {
                history_operation_id: row.get("history_operation_id"),
                trade_order: row.get("trade_order"),
                ledger_closed_at: DateTime::from_timestamp(row.get("ledger_closed_at"), 0)
                    .unwrap_or_default(),
                base_amount: row.get("base_amount"),
                counter_amount: row.get("counter_amount"),
                base_asset_id: row.get("base_asset_id"),
                counter_asset_id: row.get("counter_asset_id"),
                base_account_id: row.get("base_account_id"),
                counter_account_id: row.get("counter_account_id"),
                base_liquidity_pool_id: row.get("base_liquidity_pool_id"),
                counter_liquidity_pool_id: row.get("counter_liquidity_pool_id"),
                base_offer_id: row.get("base_offer_id"),
                counter_offer_id: row.get("counter_offer_id"),
                liquidity_pool_fee: row.get("liquidity_pool_fee"),
                price_n: row.get("price_n"),
                price_d: row.get("price_d"),
                base_is_seller: row.get("base_is_seller"),
            })
            .collect())
    }
}

#[async_trait]
impl TradeStore for Repository {
    async fn resolve_accounts(
        &self,
        addresses: &[String],
        batch_size: usize,
    ) -> Result<HashMap<String, i64>, StoreError> {
        self.resolve_in("history_accounts", "address", addresses, batch_size)
            .await
    }

    async fn resolve_assets(
        &self,
        assets: &[String],
        batch_size: usize,
    ) -> Result<HashMap<String, i64>, StoreError> {
        self.resolve_in("history_assets", "asset", assets, batch_size)
            .await
    }

    async fn resolve_pools(
        &self,
        pool_ids: &[String],
        batch_size: usize,
    ) -> Result<HashMap<String, i64>, StoreError> {
        self.resolve_in("history_liquidity_pools", "pool_id", pool_ids, batch_size)
            .await
    }

    /// Insert all rows in one transaction.
    ///
    /// Rows dedupe on (history_operation_id, trade_order), so re-running a
    /// ledger after a partial external failure does not duplicate trades.
    async fn insert_trades(&self, rows: &[TradeRow]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool().begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO history_trades (
                    history_operation_id, trade_order, ledger_closed_at,
                    base_amount, counter_amount, base_asset_id, counter_asset_id,
                    base_account_id, counter_account_id,
                    base_liquidity_pool_id, counter_liquidity_pool_id,
                    base_offer_id, counter_offer_id, liquidity_pool_fee,
                    price_n, price_d, base_is_seller
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(history_operation_id, trade_order) DO NOTHING
                "#,
            )
            .bind(row.history_operation_id)
            .bind(row.trade_order)
            .bind(row.ledger_closed_at.timestamp())
            .bind(row.base_amount)
            .bind(row.counter_amount)
            .bind(row.base_asset_id)
            .bind(row.counter_asset_id)
            .bind(row.base_account_id)
            .bind(row.counter_account_id)
            .bind(row.base_liquidity_pool_id)
            .bind(row.counter_liquidity_pool_id)
            .bind(row.base_offer_id)
            .bind(row.counter_offer_id)
            .bind(row.liquidity_pool_fee)
            .bind(row.price_n)
            .bind(row.price_d)
            .bind(row.base_is_seller)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn test_row(op_id: i64, order: i32) -> TradeRow {
        TradeRow {
            history_operation_id: op_id,
            trade_order: order,
            ledger_closed_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            base_amount: 1000,
            counter_amount: 500,
            base_asset_id: 1,
            counter_asset_id: 2,
            base_account_id: Some(1),
            counter_account_id: Some(2),
            base_liquidity_pool_id: None,
            counter_liquidity_pool_id: None,
            base_offer_id: Some(7),
            counter_offer_id: None,
            liquidity_pool_fee: None,
            price_n: 1,
            price_d: 2,
            base_is_seller: true,
        }
    }

    #[tokio::test]
    async fn test_resolve_accounts_allocates_and_reuses_ids() {
        let (repo, _temp) = setup_test_db().await;

        let keys = vec!["GA".to_string(), "GB".to_string()];
        let first = repo.resolve_accounts(&keys, 1000).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_ne!(first["GA"], first["GB"]);

        let second = repo
            .resolve_accounts(&["GB".to_string(), "GC".to_string()], 1000)
            .await
            .unwrap();
        assert_eq!(second["GB"], first["GB"]);
        assert!(!second.contains_key("GA"));
    }

    #[tokio::test]
    async fn test_resolve_respects_small_batch_size() {
        let (repo, _temp) = setup_test_db().await;

        let keys: Vec<String> = (0..10).map(|i| format!("asset{}", i)).collect();
        let ids = repo.resolve_assets(&keys, 3).await.unwrap();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn test_insert_and_read_back_trades() {
        let (repo, _temp) = setup_test_db().await;

        // Satisfy the asset/account foreign keys first.
        repo.resolve_accounts(&["GA".to_string(), "GB".to_string()], 1000)
            .await
            .unwrap();
        repo.resolve_assets(&["native".to_string(), "USD:G".to_string()], 1000)
            .await
            .unwrap();

        let op_id = history_operation_id(100, 1, 1);
        let rows = vec![test_row(op_id, 1), test_row(op_id, 2)];
        repo.insert_trades(&rows).await.unwrap();

        let stored = repo.trades_for_ledger(100).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].trade_order, 1);
        assert_eq!(stored[1].trade_order, 2);
        assert_eq!(stored[0].ledger_closed_at.timestamp(), 1_700_000_000);
        assert!(stored[0].base_is_seller);
    }

    #[tokio::test]
    async fn test_insert_trades_is_idempotent() {
        let (repo, _temp) = setup_test_db().await;

        repo.resolve_accounts(&["GA".to_string(), "GB".to_string()], 1000)
            .await
            .unwrap();
        repo.resolve_assets(&["native".to_string(), "USD:G".to_string()], 1000)
            .await
            .unwrap();

        let rows = vec![test_row(history_operation_id(100, 1, 1), 1)];
        repo.insert_trades(&rows).await.unwrap();
        repo.insert_trades(&rows).await.unwrap();

        let stored = repo.trades_for_ledger(100).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_trades_for_ledger_excludes_other_ledgers() {
        let (repo, _temp) = setup_test_db().await;

        repo.resolve_accounts(&["GA".to_string(), "GB".to_string()], 1000)
            .await
            .unwrap();
        repo.resolve_assets(&["native".to_string(), "USD:G".to_string()], 1000)
            .await
            .unwrap();

        repo.insert_trades(&[
            test_row(history_operation_id(100, 1, 1), 1),
            test_row(history_operation_id(101, 1, 1), 1),
        ])
        .await
        .unwrap();

        assert_eq!(repo.trades_for_ledger(100).await.unwrap().len(), 1);
        assert_eq!(repo.trades_for_ledger(101).await.unwrap().len(), 1);
        assert!(repo.trades_for_ledger(102).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_empty_batch_is_a_noop() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_trades(&[]).await.unwrap();
        assert!(repo.trades_for_ledger(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_nullable_columns_round_trip() {
        let (repo, _temp) = setup_test_db().await;

        repo.resolve_accounts(&["GA".to_string(), "GB".to_string()], 1000)
            .await
            .unwrap();
        repo.resolve_assets(&["native".to_string(), "USD:G".to_string()], 1000)
            .await
            .unwrap();
        repo.resolve_pools(&["aa".repeat(32)], 1000).await.unwrap();

        let mut row = test_row(history_operation_id(100, 1, 1), 1);
        row.base_account_id = None;
        row.base_offer_id = None;
        row.base_liquidity_pool_id = Some(1);
        row.liquidity_pool_fee = Some(30);
        repo.insert_trades(&[row]).await.unwrap();

        let stored = repo.trades_for_ledger(100).await.unwrap();
        assert_eq!(stored[0].base_account_id, None);
        assert_eq!(stored[0].base_liquidity_pool_id, Some(1));
        assert_eq!(stored[0].liquidity_pool_fee, Some(30));
    }
}
