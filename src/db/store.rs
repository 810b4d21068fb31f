// src/db/store.rs

//! Contratos da camada de persistência.
//!
//! Cada repositório é um trait separado; `UnitOfWork` junta todos e define o
//! ciclo de vida da transação. Sem `commit`, o drop da unidade desfaz tudo,
//! inclusive quando a função sai por `?` ou por timeout.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    models::{
        audit::{AuditLogEntry, NewAuditLogEntry},
        auth::{NewProductAdmin, NewRestaurantAdmin, ProductAdmin, RestaurantAdmin},
        customer::{CreateCustomerPayload, Customer, CustomerFilter, CustomerPatch},
        ledger::{BalanceScope, LedgerEntry, NewLedgerEntry, PointsTotal},
        restaurant::{NewRestaurant, Restaurant, RestaurantFilter, RestaurantPatch, RestaurantStatus},
    },
};

#[async_trait]
pub trait LoyaltyStore: Send + Sync {
    /// Abre uma unidade transacional isolada.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError>;

    /// Conexão sem transação, para leituras relaxadas (listagens e relatórios).
    async fn connect(&self) -> Result<Box<dyn UnitOfWork>, AppError>;
}

#[async_trait]
pub trait UnitOfWork:
    CustomerRepository + LedgerRepository + AuditRepository + RestaurantRepository + AdminRepository + Send
{
    /// Confirma tudo o que foi feito na unidade. Em modo `connect` é um no-op.
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

#[async_trait]
pub trait CustomerRepository: Send {
    async fn insert_customer(&mut self, payload: &CreateCustomerPayload) -> Result<Customer, AppError>;

    async fn find_customer(&mut self, id: Uuid) -> Result<Option<Customer>, AppError>;

    /// Busca e trava a linha do cliente até o fim da transação.
    /// Serializa operações de pontos concorrentes sobre o mesmo cliente.
    async fn lock_customer(&mut self, id: Uuid) -> Result<Option<Customer>, AppError>;

    /// E-mail ou telefone já usados por outro cliente do mesmo restaurante?
    async fn customer_contact_taken(
        &mut self,
        restaurant_id: Uuid,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError>;

    async fn update_customer(&mut self, id: Uuid, patch: &CustomerPatch) -> Result<Option<Customer>, AppError>;

    async fn delete_customer(&mut self, id: Uuid) -> Result<bool, AppError>;

    async fn delete_customers_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError>;

    async fn list_customers(
        &mut self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<(Vec<Customer>, i64), AppError>;
}

/// Livro-razão de pontos: só INSERT, leitura e DELETE em cascata.
#[async_trait]
pub trait LedgerRepository: Send {
    async fn append_ledger_entry(&mut self, entry: &NewLedgerEntry) -> Result<LedgerEntry, AppError>;

    /// Soma de `points` agrupada por tipo dentro do escopo.
    async fn ledger_totals(&mut self, scope: BalanceScope) -> Result<Vec<PointsTotal>, AppError>;

    /// Lançamentos do escopo, do mais novo para o mais antigo, com o total.
    async fn list_ledger_entries(
        &mut self,
        scope: BalanceScope,
        page: PageRequest,
    ) -> Result<(Vec<LedgerEntry>, i64), AppError>;

    async fn delete_ledger_by_customer(&mut self, customer_id: Uuid) -> Result<u64, AppError>;

    async fn delete_ledger_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError>;
}

#[async_trait]
pub trait AuditRepository: Send {
    async fn append_audit_entry(&mut self, entry: &NewAuditLogEntry) -> Result<AuditLogEntry, AppError>;

    async fn list_audit_entries(
        &mut self,
        customer_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, i64), AppError>;

    async fn delete_audit_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError>;
}

#[async_trait]
pub trait RestaurantRepository: Send {
    async fn insert_restaurant(&mut self, new: &NewRestaurant) -> Result<Restaurant, AppError>;

    async fn find_restaurant(&mut self, id: Uuid) -> Result<Option<Restaurant>, AppError>;

    async fn lock_restaurant(&mut self, id: Uuid) -> Result<Option<Restaurant>, AppError>;

    async fn find_restaurant_by_email(&mut self, email: &str) -> Result<Option<Restaurant>, AppError>;

    async fn restaurant_contact_taken(
        &mut self,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError>;

    async fn list_restaurants(
        &mut self,
        filter: &RestaurantFilter,
        page: PageRequest,
    ) -> Result<(Vec<Restaurant>, i64), AppError>;

    async fn update_restaurant(
        &mut self,
        id: Uuid,
        patch: &RestaurantPatch,
    ) -> Result<Option<Restaurant>, AppError>;

    /// Sobrescreve o status sem validar a transição.
    async fn set_restaurant_status(
        &mut self,
        id: Uuid,
        status: RestaurantStatus,
    ) -> Result<Option<Restaurant>, AppError>;

    async fn delete_restaurant(&mut self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AdminRepository: Send {
    async fn insert_product_admin(&mut self, new: &NewProductAdmin) -> Result<ProductAdmin, AppError>;

    async fn find_product_admin_by_email(&mut self, email: &str) -> Result<Option<ProductAdmin>, AppError>;

    async fn insert_restaurant_admin(&mut self, new: &NewRestaurantAdmin) -> Result<RestaurantAdmin, AppError>;

    async fn find_restaurant_admin_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<RestaurantAdmin>, AppError>;

    async fn delete_restaurant_admins_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError>;
}
