// src/db/memory.rs

//! Store em memória com a mesma semântica transacional do Postgres.
//!
//! `begin()` segura o mutex do estado inteiro e trabalha sobre uma cópia:
//! `commit` grava a cópia de volta, o drop simplesmente a descarta. Isso
//! serializa todas as unidades transacionais. `connect()` trava o mutex só
//! durante cada operação (leitura relaxada).
//!
//! Um serviço nunca deve chamar `connect()` enquanto segura um `begin()` na
//! mesma task: o mutex não é reentrante.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    common::{error::AppError, pagination::PageRequest},
    db::store::{
        AdminRepository, AuditRepository, CustomerRepository, LedgerRepository, LoyaltyStore,
        RestaurantRepository, UnitOfWork,
    },
    models::{
        audit::{AuditLogEntry, NewAuditLogEntry},
        auth::{NewProductAdmin, NewRestaurantAdmin, ProductAdmin, RestaurantAdmin},
        customer::{CreateCustomerPayload, Customer, CustomerFilter, CustomerPatch},
        ledger::{BalanceScope, LedgerEntry, NewLedgerEntry, PointsTotal, PointsType},
        restaurant::{NewRestaurant, Restaurant, RestaurantFilter, RestaurantPatch, RestaurantStatus},
    },
};

// Vetores em ordem de inserção; "mais novo primeiro" = ordem reversa.
#[derive(Debug, Clone, Default)]
struct MemoryState {
    product_admins: Vec<ProductAdmin>,
    restaurants: Vec<Restaurant>,
    restaurant_admins: Vec<RestaurantAdmin>,
    customers: Vec<Customer>,
    ledger: Vec<LedgerEntry>,
    audit: Vec<AuditLogEntry>,
}

// Falhas injetáveis nos testes
#[derive(Default)]
struct Faults {
    audit_appends: AtomicBool,
    audit_deletes: AtomicBool,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faz toda gravação de auditoria falhar, para testar o rollback.
    #[cfg(test)]
    pub(crate) fn fail_audit_appends(&self, fail: bool) {
        self.faults.audit_appends.store(fail, Ordering::SeqCst);
    }

    /// Faz a remoção de auditoria por restaurante falhar, no meio do descomissionamento.
    #[cfg(test)]
    pub(crate) fn fail_audit_deletes(&self, fail: bool) {
        self.faults.audit_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LoyaltyStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork {
            mode: Mode::Transaction { guard, working },
            faults: self.faults.clone(),
        }))
    }

    async fn connect(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        Ok(Box::new(MemoryUnitOfWork {
            mode: Mode::Direct(self.state.clone()),
            faults: self.faults.clone(),
        }))
    }
}

fn injected_fault(step: &str) -> AppError {
    AppError::StorageError(sqlx::Error::Protocol(format!("falha injetada na {}", step)))
}

enum Mode {
    Transaction {
        guard: OwnedMutexGuard<MemoryState>,
        working: MemoryState,
    },
    Direct(Arc<Mutex<MemoryState>>),
}

pub struct MemoryUnitOfWork {
    mode: Mode,
    faults: Arc<Faults>,
}

impl MemoryUnitOfWork {
    async fn with_state<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut MemoryState) -> R + Send,
        R: Send,
    {
        match &mut self.mode {
            Mode::Transaction { working, .. } => f(working),
            Mode::Direct(shared) => {
                let mut state = shared.lock().await;
                f(&mut state)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        if let Mode::Transaction { mut guard, working } = self.mode {
            *guard = working;
        }
        Ok(())
    }
}

fn paginate<T: Clone>(newest_first: Vec<&T>, page: PageRequest) -> (Vec<T>, i64) {
    let total = newest_first.len() as i64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let items = newest_first
        .into_iter()
        .skip(offset)
        .take(page.limit as usize)
        .cloned()
        .collect();
    (items, total)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl MemoryState {
    fn customer_contact_taken(
        &self,
        restaurant_id: Uuid,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> bool {
        self.customers.iter().any(|c| {
            c.restaurant_id == restaurant_id
                && Some(c.id) != exclude_id
                && (email == Some(c.email.as_str()) || phone == Some(c.phone_number.as_str()))
        })
    }

    fn restaurant_contact_taken(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> bool {
        self.restaurants.iter().any(|r| {
            Some(r.id) != exclude_id
                && (email == Some(r.email.as_str()) || phone == Some(r.phone_number.as_str()))
        })
    }

    fn insert_customer(&mut self, payload: &CreateCustomerPayload) -> Result<Customer, AppError> {
        if self.customer_contact_taken(
            payload.restaurant_id,
            Some(payload.email.as_str()),
            Some(payload.phone_number.as_str()),
            None,
        ) {
            return Err(AppError::AlreadyExists(
                "violação da restrição idx_customers_restaurant_contact".to_string(),
            ));
        }

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4(),
            restaurant_id: payload.restaurant_id,
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            gender: payload.gender,
            dob: payload.dob,
            phone_number: payload.phone_number.clone(),
            email: payload.email.clone(),
            address: payload.address.clone(),
            city: payload.city.clone(),
            state: payload.state.clone(),
            zip_code: payload.zip_code.clone(),
            agree_promotional_emails: payload.agree_promotional_emails,
            agree_data_sharing: payload.agree_data_sharing,
            created_at: now,
            updated_at: now,
        };
        self.customers.push(customer.clone());
        Ok(customer)
    }

    fn update_customer(&mut self, id: Uuid, patch: &CustomerPatch) -> Result<Option<Customer>, AppError> {
        let Some(restaurant_id) = self.customers.iter().find(|c| c.id == id).map(|c| c.restaurant_id) else {
            return Ok(None);
        };
        if self.customer_contact_taken(restaurant_id, patch.email.as_deref(), patch.phone_number.as_deref(), Some(id)) {
            return Err(AppError::AlreadyExists(
                "violação da restrição idx_customers_restaurant_contact".to_string(),
            ));
        }

        let customer = self.customers.iter_mut().find(|c| c.id == id);
        Ok(customer.map(|c| {
            patch.apply_to(c);
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    fn list_customers(&self, filter: &CustomerFilter, page: PageRequest) -> (Vec<Customer>, i64) {
        let matching: Vec<&Customer> = self
            .customers
            .iter()
            .rev()
            .filter(|c| filter.restaurant_id.is_none_or(|id| c.restaurant_id == id))
            .filter(|c| {
                filter
                    .phone
                    .as_deref()
                    .is_none_or(|phone| contains_ignore_case(&c.phone_number, phone))
            })
            .collect();
        paginate(matching, page)
    }

    fn append_ledger_entry(&mut self, entry: &NewLedgerEntry) -> LedgerEntry {
        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            customer_id: entry.customer_id,
            restaurant_id: entry.restaurant_id,
            points: entry.points,
            kind: entry.kind,
            created_at: Utc::now(),
        };
        self.ledger.push(entry.clone());
        entry
    }

    fn ledger_in_scope(&self, scope: BalanceScope) -> impl DoubleEndedIterator<Item = &LedgerEntry> {
        self.ledger.iter().filter(move |e| match scope {
            BalanceScope::Customer(id) => e.customer_id == id,
            BalanceScope::Restaurant(id) => e.restaurant_id == id,
        })
    }

    fn ledger_totals(&self, scope: BalanceScope) -> Vec<PointsTotal> {
        [PointsType::Add, PointsType::Redeem]
            .into_iter()
            .filter_map(|kind| {
                let group: Vec<i64> = self
                    .ledger_in_scope(scope)
                    .filter(|e| e.kind == kind)
                    .map(|e| e.points)
                    .collect();
                // Como no GROUP BY: grupo sem linhas não aparece
                (!group.is_empty()).then(|| PointsTotal {
                    kind,
                    total: group.iter().fold(0i64, |acc, p| acc.saturating_add(*p)),
                })
            })
            .collect()
    }

    fn list_ledger_entries(&self, scope: BalanceScope, page: PageRequest) -> (Vec<LedgerEntry>, i64) {
        paginate(self.ledger_in_scope(scope).rev().collect(), page)
    }

    fn append_audit_entry(&mut self, entry: &NewAuditLogEntry) -> AuditLogEntry {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            customer_id: entry.customer_id,
            restaurant_id: entry.restaurant_id,
            action: entry.action,
            details: entry.details.clone(),
            timestamp: Utc::now(),
        };
        self.audit.push(entry.clone());
        entry
    }

    fn insert_restaurant(&mut self, new: &NewRestaurant) -> Result<Restaurant, AppError> {
        if self.restaurant_contact_taken(Some(new.email.as_str()), Some(new.phone_number.as_str()), None) {
            return Err(AppError::AlreadyExists(
                "violação da restrição restaurants_contact".to_string(),
            ));
        }

        let now = Utc::now();
        let restaurant = Restaurant {
            id: Uuid::new_v4(),
            restaurant_name: new.restaurant_name.clone(),
            address: new.address.clone(),
            llc: new.llc.clone(),
            phone_number: new.phone_number.clone(),
            email: new.email.clone(),
            owner_name: new.owner_name.clone(),
            primary_contact: Json(new.primary_contact.clone()),
            status: new.status,
            agreement_accepted: new.agreement_accepted,
            created_by: new.created_by,
            password_hash: new.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        self.restaurants.push(restaurant.clone());
        Ok(restaurant)
    }

    fn update_restaurant(&mut self, id: Uuid, patch: &RestaurantPatch) -> Result<Option<Restaurant>, AppError> {
        if self.restaurant_contact_taken(patch.email.as_deref(), patch.phone_number.as_deref(), Some(id)) {
            return Err(AppError::AlreadyExists(
                "violação da restrição restaurants_contact".to_string(),
            ));
        }

        let restaurant = self.restaurants.iter_mut().find(|r| r.id == id);
        Ok(restaurant.map(|r| {
            patch.apply_to(r);
            r.updated_at = Utc::now();
            r.clone()
        }))
    }

    fn list_restaurants(&self, filter: &RestaurantFilter, page: PageRequest) -> (Vec<Restaurant>, i64) {
        let matching: Vec<&Restaurant> = self
            .restaurants
            .iter()
            .rev()
            .filter(|r| filter.created_from.is_none_or(|from| r.created_at >= from))
            .filter(|r| filter.created_to.is_none_or(|to| r.created_at <= to))
            .filter(|r| !filter.accepted_only || r.status == RestaurantStatus::Accepted)
            .filter(|r| {
                filter
                    .name
                    .as_deref()
                    .is_none_or(|name| contains_ignore_case(&r.restaurant_name, name))
            })
            .collect();
        paginate(matching, page)
    }

    fn insert_product_admin(&mut self, new: &NewProductAdmin) -> Result<ProductAdmin, AppError> {
        if self.product_admins.iter().any(|a| a.email == new.email) {
            return Err(AppError::AlreadyExists(
                "violação da restrição product_admins_email_key".to_string(),
            ));
        }

        let now = Utc::now();
        let admin = ProductAdmin {
            id: Uuid::new_v4(),
            username: new.username.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            phone: new.phone.clone(),
            created_at: now,
            updated_at: now,
        };
        self.product_admins.push(admin.clone());
        Ok(admin)
    }

    fn insert_restaurant_admin(&mut self, new: &NewRestaurantAdmin) -> Result<RestaurantAdmin, AppError> {
        if self.restaurant_admins.iter().any(|a| a.email == new.email) {
            return Err(AppError::AlreadyExists(
                "violação da restrição restaurant_admins_email_key".to_string(),
            ));
        }

        let now = Utc::now();
        let admin = RestaurantAdmin {
            id: Uuid::new_v4(),
            restaurant_id: new.restaurant_id,
            username: new.username.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        self.restaurant_admins.push(admin.clone());
        Ok(admin)
    }
}

/// `Vec::retain` devolvendo quantas linhas saíram
fn remove_where<T>(rows: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> u64 {
    let before = rows.len();
    rows.retain(|row| !pred(row));
    (before - rows.len()) as u64
}

#[async_trait]
impl CustomerRepository for MemoryUnitOfWork {
    async fn insert_customer(&mut self, payload: &CreateCustomerPayload) -> Result<Customer, AppError> {
        self.with_state(|s| s.insert_customer(payload)).await
    }

    async fn find_customer(&mut self, id: Uuid) -> Result<Option<Customer>, AppError> {
        Ok(self
            .with_state(|s| s.customers.iter().find(|c| c.id == id).cloned())
            .await)
    }

    async fn lock_customer(&mut self, id: Uuid) -> Result<Option<Customer>, AppError> {
        // A unidade transacional já tem acesso exclusivo ao estado
        self.find_customer(id).await
    }

    async fn customer_contact_taken(
        &mut self,
        restaurant_id: Uuid,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        Ok(self
            .with_state(|s| s.customer_contact_taken(restaurant_id, email, phone, exclude_id))
            .await)
    }

    async fn update_customer(&mut self, id: Uuid, patch: &CustomerPatch) -> Result<Option<Customer>, AppError> {
        self.with_state(|s| s.update_customer(id, patch)).await
    }

    async fn delete_customer(&mut self, id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .with_state(|s| remove_where(&mut s.customers, |c| c.id == id) > 0)
            .await)
    }

    async fn delete_customers_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError> {
        Ok(self
            .with_state(|s| remove_where(&mut s.customers, |c| c.restaurant_id == restaurant_id))
            .await)
    }

    async fn list_customers(
        &mut self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> Result<(Vec<Customer>, i64), AppError> {
        Ok(self.with_state(|s| s.list_customers(filter, page)).await)
    }
}

#[async_trait]
impl LedgerRepository for MemoryUnitOfWork {
    async fn append_ledger_entry(&mut self, entry: &NewLedgerEntry) -> Result<LedgerEntry, AppError> {
        Ok(self.with_state(|s| s.append_ledger_entry(entry)).await)
    }

    async fn ledger_totals(&mut self, scope: BalanceScope) -> Result<Vec<PointsTotal>, AppError> {
        Ok(self.with_state(|s| s.ledger_totals(scope)).await)
    }

    async fn list_ledger_entries(
        &mut self,
        scope: BalanceScope,
        page: PageRequest,
    ) -> Result<(Vec<LedgerEntry>, i64), AppError> {
        Ok(self.with_state(|s| s.list_ledger_entries(scope, page)).await)
    }

    async fn delete_ledger_by_customer(&mut self, customer_id: Uuid) -> Result<u64, AppError> {
        Ok(self
            .with_state(|s| remove_where(&mut s.ledger, |e| e.customer_id == customer_id))
            .await)
    }

    async fn delete_ledger_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError> {
        Ok(self
            .with_state(|s| remove_where(&mut s.ledger, |e| e.restaurant_id == restaurant_id))
            .await)
    }
}

#[async_trait]
impl AuditRepository for MemoryUnitOfWork {
    async fn append_audit_entry(&mut self, entry: &NewAuditLogEntry) -> Result<AuditLogEntry, AppError> {
        if self.faults.audit_appends.load(Ordering::SeqCst) {
            return Err(injected_fault("gravação de auditoria"));
        }
        Ok(self.with_state(|s| s.append_audit_entry(entry)).await)
    }

    async fn list_audit_entries(
        &mut self,
        customer_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<AuditLogEntry>, i64), AppError> {
        Ok(self
            .with_state(|s| {
                let matching: Vec<&AuditLogEntry> = s.audit.iter().rev().filter(|e| e.customer_id == customer_id).collect();
                paginate(matching, page)
            })
            .await)
    }

    async fn delete_audit_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError> {
        if self.faults.audit_deletes.load(Ordering::SeqCst) {
            return Err(injected_fault("remoção de auditoria"));
        }
        Ok(self
            .with_state(|s| remove_where(&mut s.audit, |e| e.restaurant_id == restaurant_id))
            .await)
    }
}

#[async_trait]
impl RestaurantRepository for MemoryUnitOfWork {
    async fn insert_restaurant(&mut self, new: &NewRestaurant) -> Result<Restaurant, AppError> {
        self.with_state(|s| s.insert_restaurant(new)).await
    }

    async fn find_restaurant(&mut self, id: Uuid) -> Result<Option<Restaurant>, AppError> {
        Ok(self
            .with_state(|s| s.restaurants.iter().find(|r| r.id == id).cloned())
            .await)
    }

    async fn lock_restaurant(&mut self, id: Uuid) -> Result<Option<Restaurant>, AppError> {
        self.find_restaurant(id).await
    }

    async fn find_restaurant_by_email(&mut self, email: &str) -> Result<Option<Restaurant>, AppError> {
        Ok(self
            .with_state(|s| s.restaurants.iter().find(|r| r.email == email).cloned())
            .await)
    }

    async fn restaurant_contact_taken(
        &mut self,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppError> {
        Ok(self
            .with_state(|s| s.restaurant_contact_taken(email, phone, exclude_id))
            .await)
    }

    async fn list_restaurants(
        &mut self,
        filter: &RestaurantFilter,
        page: PageRequest,
    ) -> Result<(Vec<Restaurant>, i64), AppError> {
        Ok(self.with_state(|s| s.list_restaurants(filter, page)).await)
    }

    async fn update_restaurant(
        &mut self,
        id: Uuid,
        patch: &RestaurantPatch,
    ) -> Result<Option<Restaurant>, AppError> {
        self.with_state(|s| s.update_restaurant(id, patch)).await
    }

    async fn set_restaurant_status(
        &mut self,
        id: Uuid,
        status: RestaurantStatus,
    ) -> Result<Option<Restaurant>, AppError> {
        Ok(self
            .with_state(|s| {
                s.restaurants.iter_mut().find(|r| r.id == id).map(|r| {
                    r.status = status;
                    r.updated_at = Utc::now();
                    r.clone()
                })
            })
            .await)
    }

    async fn delete_restaurant(&mut self, id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .with_state(|s| remove_where(&mut s.restaurants, |r| r.id == id) > 0)
            .await)
    }
}

#[async_trait]
impl AdminRepository for MemoryUnitOfWork {
    async fn insert_product_admin(&mut self, new: &NewProductAdmin) -> Result<ProductAdmin, AppError> {
        self.with_state(|s| s.insert_product_admin(new)).await
    }

    async fn find_product_admin_by_email(&mut self, email: &str) -> Result<Option<ProductAdmin>, AppError> {
        Ok(self
            .with_state(|s| s.product_admins.iter().find(|a| a.email == email).cloned())
            .await)
    }

    async fn insert_restaurant_admin(&mut self, new: &NewRestaurantAdmin) -> Result<RestaurantAdmin, AppError> {
        self.with_state(|s| s.insert_restaurant_admin(new)).await
    }

    async fn find_restaurant_admin_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<RestaurantAdmin>, AppError> {
        Ok(self
            .with_state(|s| s.restaurant_admins.iter().find(|a| a.email == email).cloned())
            .await)
    }

    async fn delete_restaurant_admins_by_restaurant(&mut self, restaurant_id: Uuid) -> Result<u64, AppError> {
        Ok(self
            .with_state(|s| remove_where(&mut s.restaurant_admins, |a| a.restaurant_id == restaurant_id))
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(customer_id: Uuid, restaurant_id: Uuid, points: i64, kind: PointsType) -> NewLedgerEntry {
        NewLedgerEntry::new(customer_id, restaurant_id, points, kind)
    }

    #[tokio::test]
    async fn dropped_unit_of_work_rolls_back() {
        let store = MemoryStore::new();
        let (customer, restaurant) = (Uuid::new_v4(), Uuid::new_v4());

        {
            let mut tx = store.begin().await.unwrap();
            tx.append_ledger_entry(&entry(customer, restaurant, 10, PointsType::Add))
                .await
                .unwrap();
            // sem commit
        }

        let mut conn = store.connect().await.unwrap();
        let (entries, total) = conn
            .list_ledger_entries(BalanceScope::Customer(customer), PageRequest::default())
            .await
            .unwrap();
        assert!(entries.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn committed_unit_of_work_is_visible() {
        let store = MemoryStore::new();
        let (customer, restaurant) = (Uuid::new_v4(), Uuid::new_v4());

        let mut tx = store.begin().await.unwrap();
        tx.append_ledger_entry(&entry(customer, restaurant, 10, PointsType::Add))
            .await
            .unwrap();
        tx.append_ledger_entry(&entry(customer, restaurant, 4, PointsType::Redeem))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut conn = store.connect().await.unwrap();
        let mut totals = conn.ledger_totals(BalanceScope::Restaurant(restaurant)).await.unwrap();
        totals.sort_by_key(|t| t.total);
        assert_eq!(
            totals,
            vec![
                PointsTotal { kind: PointsType::Redeem, total: -4 },
                PointsTotal { kind: PointsType::Add, total: 10 },
            ]
        );
    }

    #[tokio::test]
    async fn ledger_listing_is_newest_first() {
        let store = MemoryStore::new();
        let (customer, restaurant) = (Uuid::new_v4(), Uuid::new_v4());

        let mut tx = store.begin().await.unwrap();
        for points in 1..=3 {
            tx.append_ledger_entry(&entry(customer, restaurant, points, PointsType::Add))
                .await
                .unwrap();
        }
        tx.commit().await.unwrap();

        let mut conn = store.connect().await.unwrap();
        let (entries, total) = conn
            .list_ledger_entries(BalanceScope::Customer(customer), PageRequest::new(Some(1), Some(2)))
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(entries.iter().map(|e| e.points).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[tokio::test]
    async fn injected_audit_failure_surfaces_as_storage_error() {
        let store = MemoryStore::new();
        store.fail_audit_appends(true);

        let mut tx = store.begin().await.unwrap();
        let err = tx
            .append_audit_entry(&NewAuditLogEntry::sign_up(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageError(_)));
    }

    #[tokio::test]
    async fn restaurant_filters_apply() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        for (i, (name, status)) in [
            ("Cantina da Nona", RestaurantStatus::Accepted),
            ("Bar do Zé", RestaurantStatus::Pending),
            ("Nona Pizzaria", RestaurantStatus::Rejected),
        ]
        .into_iter()
        .enumerate()
        {
            tx.insert_restaurant(&NewRestaurant {
                restaurant_name: name.to_string(),
                address: "Rua A, 1".to_string(),
                llc: "LLC".to_string(),
                phone_number: format!("555000000{}", i),
                email: format!("r{}@example.com", i),
                owner_name: "Dono".to_string(),
                primary_contact: crate::models::restaurant::PrimaryContactDetails {
                    name: "Contato".to_string(),
                    address: "Rua A, 1".to_string(),
                    email: "contato@example.com".to_string(),
                },
                status,
                agreement_accepted: true,
                created_by: None,
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();

        let mut conn = store.connect().await.unwrap();
        let by_name = RestaurantFilter {
            name: Some("NONA".to_string()),
            ..Default::default()
        };
        let (rows, total) = conn.list_restaurants(&by_name, PageRequest::default()).await.unwrap();
        assert_eq!(total, 2);
        assert!(rows.iter().all(|r| r.restaurant_name.contains("Nona")));

        let accepted = RestaurantFilter {
            accepted_only: true,
            ..Default::default()
        };
        let (rows, _) = conn.list_restaurants(&accepted, PageRequest::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].restaurant_name, "Cantina da Nona");
    }
}
