// src/services/customer_service.rs

use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::LoyaltyStore,
    models::{
        audit::{AuditLogEntry, NewAuditLogEntry},
        auth::Principal,
        customer::{CreateCustomerPayload, Customer, CustomerFilter, CustomerPatch, CustomerProfile},
        ledger::BalanceScope,
    },
    services::{balance_service::compute_in, bounded},
};

const CONTACT_TAKEN: &str = "Já existe um cliente com este e-mail ou telefone neste restaurante.";

#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn LoyaltyStore>,
    tx_timeout: Duration,
}

impl CustomerService {
    pub fn new(store: Arc<dyn LoyaltyStore>, tx_timeout: Duration) -> Self {
        Self { store, tx_timeout }
    }

    /// Cadastro + auditoria de SignUp na mesma transação.
    pub async fn create_customer(
        &self,
        principal: &Principal,
        payload: CreateCustomerPayload,
    ) -> Result<Customer, AppError> {
        principal.ensure_restaurant_access(payload.restaurant_id)?;

        let customer = bounded(self.tx_timeout, "create_customer", self.insert_with_audit(&payload)).await?;
        tracing::info!(customer_id = %customer.id, restaurant_id = %customer.restaurant_id, "Cliente cadastrado");
        Ok(customer)
    }

    async fn insert_with_audit(&self, payload: &CreateCustomerPayload) -> Result<Customer, AppError> {
        let mut tx = self.store.begin().await?;

        // Trava o restaurante: um descomissionamento concorrente espera ou é esperado
        tx.lock_restaurant(payload.restaurant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurante"))?;

        if tx
            .customer_contact_taken(
                payload.restaurant_id,
                Some(payload.email.as_str()),
                Some(payload.phone_number.as_str()),
                None,
            )
            .await?
        {
            return Err(AppError::AlreadyExists(CONTACT_TAKEN.to_string()));
        }

        let customer = tx.insert_customer(payload).await?;
        tx.append_audit_entry(&NewAuditLogEntry::sign_up(customer.id, customer.restaurant_id))
            .await?;
        tx.commit().await?;
        Ok(customer)
    }

    pub async fn get_profile(&self, principal: &Principal, customer_id: Uuid) -> Result<CustomerProfile, AppError> {
        let mut conn = self.store.connect().await?;
        let customer = conn
            .find_customer(customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;
        principal.ensure_restaurant_access(customer.restaurant_id)?;

        let balance = compute_in(conn.as_mut(), BalanceScope::Customer(customer.id)).await?;
        Ok(CustomerProfile::new(customer, balance))
    }

    pub async fn edit_customer(
        &self,
        principal: &Principal,
        customer_id: Uuid,
        patch: CustomerPatch,
    ) -> Result<Customer, AppError> {
        if patch.is_empty() {
            return Err(AppError::InvalidInput("Nenhum campo para atualizar.".to_string()));
        }

        bounded(
            self.tx_timeout,
            "edit_customer",
            self.apply_patch(principal, customer_id, &patch),
        )
        .await
    }

    async fn apply_patch(
        &self,
        principal: &Principal,
        customer_id: Uuid,
        patch: &CustomerPatch,
    ) -> Result<Customer, AppError> {
        let mut tx = self.store.begin().await?;
        let current = tx
            .lock_customer(customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;
        principal.ensure_restaurant_access(current.restaurant_id)?;

        if (patch.email.is_some() || patch.phone_number.is_some())
            && tx
                .customer_contact_taken(
                    current.restaurant_id,
                    patch.email.as_deref(),
                    patch.phone_number.as_deref(),
                    Some(customer_id),
                )
                .await?
        {
            return Err(AppError::AlreadyExists(CONTACT_TAKEN.to_string()));
        }

        let updated = tx
            .update_customer(customer_id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Remove o cliente do programa: apaga o livro-razão dele, registra
    /// DeleteProfile (o histórico de auditoria fica) e apaga o cadastro.
    pub async fn remove_customer(&self, principal: &Principal, customer_id: Uuid) -> Result<(), AppError> {
        let purged = bounded(
            self.tx_timeout,
            "remove_customer",
            self.purge_customer(principal, customer_id),
        )
        .await?;
        tracing::info!(%customer_id, ledger_entries = purged, "Cliente removido do programa");
        Ok(())
    }

    async fn purge_customer(&self, principal: &Principal, customer_id: Uuid) -> Result<u64, AppError> {
        let mut tx = self.store.begin().await?;
        let customer = tx
            .lock_customer(customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;
        principal.ensure_restaurant_access(customer.restaurant_id)?;

        let purged = tx.delete_ledger_by_customer(customer.id).await?;
        tx.append_audit_entry(&NewAuditLogEntry::delete_profile(customer.id, customer.restaurant_id))
            .await?;
        tx.delete_customer(customer.id).await?;
        tx.commit().await?;
        Ok(purged)
    }

    pub async fn customer_logs(
        &self,
        principal: &Principal,
        customer_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<AuditLogEntry>, AppError> {
        let mut conn = self.store.connect().await?;
        let customer = conn
            .find_customer(customer_id)
            .await?
            .ok_or_else(|| AppError::not_found("Cliente"))?;
        principal.ensure_restaurant_access(customer.restaurant_id)?;

        let (entries, total) = conn.list_audit_entries(customer_id, page).await?;
        Ok(Page::new(entries, total, page))
    }

    /// Listagem com saldo por cliente. Administrador de restaurante só vê
    /// o próprio tenant, independente do filtro pedido.
    pub async fn list_customers(
        &self,
        principal: &Principal,
        mut filter: CustomerFilter,
        page: PageRequest,
    ) -> Result<Page<CustomerProfile>, AppError> {
        if let Some(own) = principal.restaurant_scope() {
            if filter.restaurant_id.is_some_and(|requested| requested != own) {
                return Err(AppError::Forbidden(
                    "Recurso pertence a outro restaurante.".to_string(),
                ));
            }
            filter.restaurant_id = Some(own);
        }

        let mut conn = self.store.connect().await?;
        let (customers, total) = conn.list_customers(&filter, page).await?;

        let mut profiles = Vec::with_capacity(customers.len());
        for customer in customers {
            let balance = compute_in(conn.as_mut(), BalanceScope::Customer(customer.id)).await?;
            profiles.push(CustomerProfile::new(customer, balance));
        }

        Ok(Page::new(profiles, total, page))
    }
}
