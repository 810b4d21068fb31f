// src/db/postgres/ledger_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use super::{map_db_error, offset_param, PgUnitOfWork};
use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::store::LedgerRepository,
    models::ledger::{BalanceScope, LedgerEntry, NewLedgerEntry, PointsTotal},
};

const TOTALS_BY_CUSTOMER: &str = r#"
    SELECT kind,
        LEAST(GREATEST(COALESCE(SUM(points), 0), -9223372036854775808), 9223372036854775807)::BIGINT AS total
    FROM reward_points
    WHERE customer_id = $1
    GROUP BY kind
"#;

const TOTALS_BY_RESTAURANT: &str = r#"
    SELECT kind,
        LEAST(GREATEST(COALESCE(SUM(points), 0), -9223372036854775808), 9223372036854775807)::BIGINT AS total
    FROM reward_points
    WHERE restaurant_id = $1
    GROUP BY kind
"#;

const COUNT_BY_CUSTOMER: &str = "SELECT COUNT(*) FROM reward_points WHERE customer_id = $1";
const COUNT_BY_RESTAURANT: &str = "SELECT COUNT(*) FROM reward_points WHERE restaurant_id = $1";

const PAGE_BY_CUSTOMER: &str = r#"
    SELECT * FROM reward_points
    WHERE customer_id = $1
    ORDER BY created_at DESC, id DESC
    LIMIT $2 OFFSET $3
"#;

const PAGE_BY_RESTAURANT: &str = r#"
    SELECT * FROM reward_points
    WHERE restaurant_id = $1
    ORDER BY created_at DESC, id DESC
    LIMIT $2 OFFSET $3
"#;

#[async_trait]
impl LedgerRepository for PgUnitOfWork {
    async fn append_ledger_entry(&mut self, entry: &NewLedgerEntry) -> Result<LedgerEntry, AppError> {
        sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO reward_points (customer_id, restaurant_id, points, kind)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(entry.customer_id)
        .bind(entry.restaurant_id)
        .bind(entry.points)
        .bind(entry.kind)
        .fetch_one(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn ledger_totals(&mut self, scope: BalanceScope) -> Result<Vec<PointsTotal>, AppError> {
        let (sql, id) = match scope {
            BalanceScope::Customer(id) => (TOTALS_BY_CUSTOMER, id),
            BalanceScope::Restaurant(id) => (TOTALS_BY_RESTAURANT, id),
        };

        sqlx::query_as::<_, PointsTotal>(sql)
            .bind(id)
            .fetch_all(self.conn())
            .await
            .map_err(map_db_error)
    }

    async fn list_ledger_entries(
        &mut self,
        scope: BalanceScope,
        page: PageRequest,
    ) -> Result<(Vec<LedgerEntry>, i64), AppError> {
        let (count_sql, page_sql, id) = match scope {
            BalanceScope::Customer(id) => (COUNT_BY_CUSTOMER, PAGE_BY_CUSTOMER, id),
            BalanceScope::Restaurant(id) => (COUNT_BY_RESTAURANT, PAGE_BY_RESTAURANT, id),
        };

        let total = sqlx::query_scalar::<_, i64>(count_sql)
            .bind(id)
            .fetch_one(self.conn())
            .await
            .map_err(map_db_error)?;

        let entries = sqlx::query_as::<_, LedgerEntry>(page_sql)
            .bind(id)
            .bind(i64::from(page.limit))
            .bind(offset_param(page.offset()))
            .fetch_all(self.conn())
            .await
            .map_err(map_db_error)?;

        Ok((entries, total))
    }

    async fn delete_ledger_by_customer(&mut self, customer_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM reward_points WHERE customer_id = $1")
            .bind(customer_id)
            .execute(self.conn())
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_ledger_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM reward_points WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .execute(self.conn())
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected())
    }
}
