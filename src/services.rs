pub mod auth;
pub mod balance_service;
pub mod customer_service;
pub mod ledger_service;
pub mod notification;
pub mod restaurant_service;
pub mod reward_service;

use std::{future::Future, time::Duration};

use crate::common::error::AppError;

/// Executa uma unidade transacional com prazo. Se o prazo estoura, o future
/// é descartado junto com a transação aberta, que sofre rollback no drop.
pub(crate) async fn bounded<T, F>(limit: Duration, operation: &'static str, work: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(operation, limit_ms = limit.as_millis() as u64, "⏱️ Transação excedeu o tempo limite");
            Err(AppError::Timeout)
        }
    }
}
