// src/db/postgres/audit_repo.rs

use async_trait::async_trait;
use uuid::Uuid;

use super::{map_db_error, offset_param, PgUnitOfWork};
use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::store::AuditRepository,
    models::audit::{AuditLogEntry, NewAuditLogEntry},
};

#[async_trait]
impl AuditRepository for PgUnitOfWork {
    async fn append_audit_entry(&mut self, entry: &NewAuditLogEntry) -> Result<AuditLogEntry, AppError> {
        sqlx::query_as::<_, AuditLogEntry>(
            r#"
            INSERT INTO customer_logs (customer_id, restaurant_id, action, details)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(entry.customer_id)
        .bind(entry.restaurant_id)
        .bind(entry.action)
        .bind(&entry.details)
        .fetch_one(self.conn())
        .await
        .map_err(map_db_error)
    }

    async fn list_audit_entries(
        &mut self,
        customer_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, i64), AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customer_logs WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(self.conn())
            .await
            .map_err(map_db_error)?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT * FROM customer_logs
            WHERE customer_id = $1
            ORDER BY timestamp DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(customer_id)
        .bind(i64::from(page.limit))
        .bind(offset_param(page.offset()))
        .fetch_all(self.conn())
        .await
        .map_err(map_db_error)?;

        Ok((entries, total))
    }

    async fn delete_audit_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM customer_logs WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .execute(self.conn())
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected())
    }
}
