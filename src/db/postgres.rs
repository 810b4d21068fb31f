// src/db/postgres.rs

//! Implementação Postgres dos repositórios.
//!
//! Cada `*_repo.rs` implementa um dos traits de `store.rs` para
//! `PgUnitOfWork`, usando queries em tempo de execução (`query_as::<_, T>`).

mod admin_repo;
mod audit_repo;
mod customer_repo;
mod ledger_repo;
mod restaurant_repo;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{pool::PoolConnection, PgConnection, PgPool, Postgres, Transaction};

use crate::{
    common::error::AppError,
    db::store::{LoyaltyStore, UnitOfWork},
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    tx_timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool, tx_timeout: Duration) -> Self {
        Self { pool, tx_timeout }
    }

    fn timeout_setting(&self) -> String {
        format!("{}ms", self.tx_timeout.as_millis())
    }
}

#[async_trait]
impl LoyaltyStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Valem só para esta transação (is_local = true)
        let limit = self.timeout_setting();
        sqlx::query(
            "SELECT set_config('lock_timeout', $1, true), set_config('statement_timeout', $1, true)",
        )
        .bind(&limit)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        Ok(Box::new(PgUnitOfWork {
            conn: PgConn::Tx(tx),
        }))
    }

    async fn connect(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;

        // Fora de transação o ajuste vale para a sessão
        sqlx::query("SELECT set_config('statement_timeout', $1, false)")
            .bind(self.timeout_setting())
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;

        Ok(Box::new(PgUnitOfWork {
            conn: PgConn::Pooled(conn),
        }))
    }
}

enum PgConn {
    Tx(Transaction<'static, Postgres>),
    Pooled(PoolConnection<Postgres>),
}

pub struct PgUnitOfWork {
    conn: PgConn,
}

impl PgUnitOfWork {
    /// Executor usado pelos repositórios, seja transação ou conexão avulsa.
    fn conn(&mut self) -> &mut PgConnection {
        match &mut self.conn {
            PgConn::Tx(tx) => &mut **tx,
            PgConn::Pooled(conn) => &mut **conn,
        }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        match self.conn {
            PgConn::Tx(tx) => tx.commit().await.map_err(map_db_error),
            PgConn::Pooled(_) => Ok(()),
        }
    }
}

/// Traduz os códigos SQLSTATE relevantes para variantes de domínio.
pub(crate) fn map_db_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique");
            return AppError::AlreadyExists(format!("violação da restrição {}", constraint));
        }

        match db_err.code().as_deref() {
            // serialization_failure, deadlock_detected, lock_not_available
            Some("40001") | Some("40P01") | Some("55P03") => {
                return AppError::Conflict(db_err.message().to_string());
            }
            // query_canceled (statement_timeout)
            Some("57014") => return AppError::Timeout,
            _ => {}
        }
    }

    if matches!(err, sqlx::Error::PoolTimedOut) {
        return AppError::Timeout;
    }

    AppError::StorageError(err)
}

/// `u64` do offset cabe em `i64` para qualquer página que o `PageRequest` aceita.
fn offset_param(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}
