// src/services/ledger_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::LoyaltyStore,
    models::{
        auth::Principal,
        ledger::{BalanceScope, LedgerEntry},
    },
};

/// Consultas ao livro-razão. As gravações acontecem só dentro dos
/// coordenadores (recompensa, remoção de cliente, descomissionamento).
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LoyaltyStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LoyaltyStore>) -> Self {
        Self { store }
    }

    /// Extrato de um cliente para quem está autenticado. Administrador de
    /// restaurante só consulta clientes do próprio tenant.
    pub async fn list_for_principal(
        &self,
        principal: &Principal,
        customer_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, AppError> {
        if principal.restaurant_scope().is_some() {
            let mut conn = self.store.connect().await?;
            let customer = conn
                .find_customer(customer_id)
                .await?
                .ok_or_else(|| AppError::not_found("Cliente"))?;
            principal.ensure_restaurant_access(customer.restaurant_id)?;
        }

        self.list_by_customer(customer_id, page).await
    }

    pub async fn list_by_customer(&self, customer_id: Uuid, page: PageRequest) -> Result<Page<LedgerEntry>, AppError> {
        self.list(BalanceScope::Customer(customer_id), page).await
    }

    pub async fn list_by_restaurant(
        &self,
        restaurant_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, AppError> {
        self.list(BalanceScope::Restaurant(restaurant_id), page).await
    }

    async fn list(&self, scope: BalanceScope, page: PageRequest) -> Result<Page<LedgerEntry>, AppError> {
        let mut conn = self.store.connect().await?;
        let (entries, total) = conn.list_ledger_entries(scope, page).await?;
        Ok(Page::new(entries, total, page))
    }
}
