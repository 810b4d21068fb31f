// src/services/restaurant_service.rs

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::LoyaltyStore,
    models::{
        auth::{CreateRestaurantAdminPayload, NewRestaurantAdmin, RestaurantAdmin},
        ledger::BalanceScope,
        restaurant::{
            CreateRestaurantPayload, EditRestaurantPayload, NewRestaurant, Restaurant, RestaurantFilter,
            RestaurantPatch, RestaurantStatus, RestaurantSummary,
        },
    },
    services::{auth::hash_password, balance_service::compute_in, bounded},
};

const CONTACT_TAKEN: &str = "Já existe um restaurante com este e-mail ou telefone.";
const ADMIN_EMAIL_TAKEN: &str = "Já existe um acesso de restaurante com este e-mail.";

/// Quem está cadastrando o restaurante
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Onboarding {
    /// Administrador do produto; o status pedido é respeitado
    ByProductAdmin(Uuid),
    /// Auto-cadastro público; sempre entra como Pending
    SelfService,
}

/// Quantas linhas cada etapa do descomissionamento removeu
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecommissionReport {
    pub admins: u64,
    pub customers: u64,
    pub ledger_entries: u64,
    pub audit_entries: u64,
}

#[derive(Clone)]
pub struct RestaurantService {
    store: Arc<dyn LoyaltyStore>,
    tx_timeout: Duration,
}

impl RestaurantService {
    pub fn new(store: Arc<dyn LoyaltyStore>, tx_timeout: Duration) -> Self {
        Self { store, tx_timeout }
    }

    pub async fn create_restaurant(
        &self,
        payload: CreateRestaurantPayload,
        onboarding: Onboarding,
    ) -> Result<Restaurant, AppError> {
        let (status, created_by) = match onboarding {
            Onboarding::ByProductAdmin(admin_id) => {
                (payload.status.unwrap_or(RestaurantStatus::Pending), Some(admin_id))
            }
            Onboarding::SelfService => (RestaurantStatus::Pending, None),
        };

        let password_hash = hash_password(&payload.password).await?;
        let new = NewRestaurant {
            restaurant_name: payload.restaurant_name,
            address: payload.address,
            llc: payload.llc,
            phone_number: payload.phone_number,
            email: payload.email,
            owner_name: payload.owner_name,
            primary_contact: payload.primary_contact_details,
            status,
            agreement_accepted: payload.agreement_accepted,
            created_by,
            password_hash,
        };

        let restaurant = bounded(self.tx_timeout, "create_restaurant", self.insert_restaurant(&new)).await?;
        tracing::info!(restaurant_id = %restaurant.id, status = ?restaurant.status, "Restaurante cadastrado");
        Ok(restaurant)
    }

    async fn insert_restaurant(&self, new: &NewRestaurant) -> Result<Restaurant, AppError> {
        let mut tx = self.store.begin().await?;
        if tx
            .restaurant_contact_taken(Some(new.email.as_str()), Some(new.phone_number.as_str()), None)
            .await?
        {
            return Err(AppError::AlreadyExists(CONTACT_TAKEN.to_string()));
        }
        // Senão a conta do restaurante encobriria o login do funcionário
        if tx.find_restaurant_admin_by_email(&new.email).await?.is_some() {
            return Err(AppError::AlreadyExists(ADMIN_EMAIL_TAKEN.to_string()));
        }

        let restaurant = tx.insert_restaurant(new).await?;
        tx.commit().await?;
        Ok(restaurant)
    }

    pub async fn list_restaurants(
        &self,
        filter: &RestaurantFilter,
        page: PageRequest,
    ) -> Result<Page<Restaurant>, AppError> {
        let mut conn = self.store.connect().await?;
        let (restaurants, total) = conn.list_restaurants(filter, page).await?;
        Ok(Page::new(restaurants, total, page))
    }

    /// Restaurante com o saldo somado de todos os clientes.
    pub async fn get_restaurant(&self, restaurant_id: Uuid) -> Result<RestaurantSummary, AppError> {
        let mut conn = self.store.connect().await?;
        let restaurant = conn
            .find_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurante"))?;

        let balance = compute_in(conn.as_mut(), BalanceScope::Restaurant(restaurant.id)).await?;
        Ok(RestaurantSummary::new(restaurant, balance))
    }

    pub async fn edit_restaurant(
        &self,
        restaurant_id: Uuid,
        payload: EditRestaurantPayload,
    ) -> Result<Restaurant, AppError> {
        let password_hash = match &payload.password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let patch = RestaurantPatch {
            restaurant_name: payload.restaurant_name,
            address: payload.address,
            llc: payload.llc,
            phone_number: payload.phone_number,
            email: payload.email,
            owner_name: payload.owner_name,
            primary_contact: payload.primary_contact_details,
            password_hash,
        };
        if patch.is_empty() {
            return Err(AppError::InvalidInput("Nenhum campo para atualizar.".to_string()));
        }

        bounded(
            self.tx_timeout,
            "edit_restaurant",
            self.apply_patch(restaurant_id, &patch),
        )
        .await
    }

    async fn apply_patch(&self, restaurant_id: Uuid, patch: &RestaurantPatch) -> Result<Restaurant, AppError> {
        let mut tx = self.store.begin().await?;
        tx.lock_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurante"))?;

        if (patch.email.is_some() || patch.phone_number.is_some())
            && tx
                .restaurant_contact_taken(
                    patch.email.as_deref(),
                    patch.phone_number.as_deref(),
                    Some(restaurant_id),
                )
                .await?
        {
            return Err(AppError::AlreadyExists(CONTACT_TAKEN.to_string()));
        }
        if let Some(email) = patch.email.as_deref() {
            if tx.find_restaurant_admin_by_email(email).await?.is_some() {
                return Err(AppError::AlreadyExists(ADMIN_EMAIL_TAKEN.to_string()));
            }
        }

        let updated = tx
            .update_restaurant(restaurant_id, patch)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurante"))?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Sobrescrita incondicional: qualquer status pode ir para qualquer outro.
    pub async fn set_status(&self, restaurant_id: Uuid, status: RestaurantStatus) -> Result<Restaurant, AppError> {
        let restaurant = bounded(self.tx_timeout, "set_status", self.write_status(restaurant_id, status)).await?;

        tracing::info!(%restaurant_id, status = ?status, "Status do restaurante atualizado");
        Ok(restaurant)
    }

    async fn write_status(&self, restaurant_id: Uuid, status: RestaurantStatus) -> Result<Restaurant, AppError> {
        let mut tx = self.store.begin().await?;
        let restaurant = tx
            .set_restaurant_status(restaurant_id, status)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurante"))?;
        tx.commit().await?;
        Ok(restaurant)
    }

    pub async fn add_restaurant_admin(
        &self,
        restaurant_id: Uuid,
        payload: CreateRestaurantAdminPayload,
    ) -> Result<RestaurantAdmin, AppError> {
        let new = NewRestaurantAdmin {
            restaurant_id,
            password_hash: hash_password(&payload.password).await?,
            username: payload.username,
            email: payload.email,
        };

        bounded(self.tx_timeout, "add_restaurant_admin", self.insert_admin(&new)).await
    }

    async fn insert_admin(&self, new: &NewRestaurantAdmin) -> Result<RestaurantAdmin, AppError> {
        let mut tx = self.store.begin().await?;
        tx.lock_restaurant(new.restaurant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurante"))?;

        // O login procura primeiro na tabela de restaurantes: o e-mail não pode colidir com ela
        let taken = tx.find_restaurant_admin_by_email(&new.email).await?.is_some()
            || tx.find_restaurant_by_email(&new.email).await?.is_some();
        if taken {
            return Err(AppError::AlreadyExists(ADMIN_EMAIL_TAKEN.to_string()));
        }

        let admin = tx.insert_restaurant_admin(new).await?;
        tx.commit().await?;
        Ok(admin)
    }

    /// Remove o restaurante e tudo que pertence a ele numa única transação.
    ///
    /// Os clientes saem antes do livro-razão: no Postgres o DELETE espera
    /// qualquer movimentação de pontos em andamento (que trava a linha do
    /// cliente), então nenhum lançamento confirmado depois fica órfão.
    pub async fn decommission_restaurant(&self, restaurant_id: Uuid) -> Result<DecommissionReport, AppError> {
        let report = bounded(
            self.tx_timeout,
            "decommission_restaurant",
            self.cascade_delete(restaurant_id),
        )
        .await?;

        tracing::info!(
            %restaurant_id,
            admins = report.admins,
            customers = report.customers,
            ledger_entries = report.ledger_entries,
            audit_entries = report.audit_entries,
            "🗑️ Restaurante descomissionado"
        );
        Ok(report)
    }

    async fn cascade_delete(&self, restaurant_id: Uuid) -> Result<DecommissionReport, AppError> {
        let mut tx = self.store.begin().await?;
        tx.lock_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurante"))?;

        let report = DecommissionReport {
            admins: tx.delete_restaurant_admins_by_restaurant(restaurant_id).await?,
            customers: tx.delete_customers_by_restaurant(restaurant_id).await?,
            ledger_entries: tx.delete_ledger_by_restaurant(restaurant_id).await?,
            audit_entries: tx.delete_audit_by_restaurant(restaurant_id).await?,
        };
        tx.delete_restaurant(restaurant_id).await?;
        tx.commit().await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        db::MemoryStore,
        models::{
            audit::NewAuditLogEntry,
            customer::{CreateCustomerPayload, Gender},
            ledger::{NewLedgerEntry, PointsType},
            restaurant::PrimaryContactDetails,
        },
    };

    fn service(store: &MemoryStore) -> RestaurantService {
        RestaurantService::new(Arc::new(store.clone()), Duration::from_secs(2))
    }

    fn payload(email: &str, phone: &str, status: Option<RestaurantStatus>) -> CreateRestaurantPayload {
        CreateRestaurantPayload {
            restaurant_name: "Cantina da Nona".to_string(),
            address: "Rua F, 6".to_string(),
            llc: "Nona LLC".to_string(),
            phone_number: phone.to_string(),
            email: email.to_string(),
            owner_name: "Nona".to_string(),
            primary_contact_details: PrimaryContactDetails {
                name: "Nona".to_string(),
                address: "Rua F, 6".to_string(),
                email: "nona@example.com".to_string(),
            },
            agreement_accepted: true,
            status,
            password: "segredo1".to_string(),
        }
    }

    #[tokio::test]
    async fn self_service_signup_is_always_pending() {
        let store = MemoryStore::new();
        let restaurants = service(&store);

        let restaurant = restaurants
            .create_restaurant(
                payload("a@example.com", "5550000001", Some(RestaurantStatus::Accepted)),
                Onboarding::SelfService,
            )
            .await
            .unwrap();
        assert_eq!(restaurant.status, RestaurantStatus::Pending);
        assert_eq!(restaurant.created_by, None);

        let admin = Uuid::new_v4();
        let restaurant = restaurants
            .create_restaurant(
                payload("b@example.com", "5550000002", Some(RestaurantStatus::Accepted)),
                Onboarding::ByProductAdmin(admin),
            )
            .await
            .unwrap();
        assert_eq!(restaurant.status, RestaurantStatus::Accepted);
        assert_eq!(restaurant.created_by, Some(admin));
    }

    #[tokio::test]
    async fn duplicate_contact_is_rejected() {
        let store = MemoryStore::new();
        let restaurants = service(&store);
        restaurants
            .create_restaurant(payload("a@example.com", "5550000001", None), Onboarding::SelfService)
            .await
            .unwrap();

        let err = restaurants
            .create_restaurant(payload("outro@example.com", "5550000001", None), Onboarding::SelfService)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn status_can_move_between_any_states() {
        let store = MemoryStore::new();
        let restaurants = service(&store);
        let restaurant = restaurants
            .create_restaurant(payload("a@example.com", "5550000001", None), Onboarding::SelfService)
            .await
            .unwrap();

        for status in [
            RestaurantStatus::Rejected,
            RestaurantStatus::Accepted,
            RestaurantStatus::Pending,
            RestaurantStatus::Accepted,
        ] {
            let updated = restaurants.set_status(restaurant.id, status).await.unwrap();
            assert_eq!(updated.status, status);
        }

        let err = restaurants
            .set_status(Uuid::new_v4(), RestaurantStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn edit_keeps_untouched_fields() {
        let store = MemoryStore::new();
        let restaurants = service(&store);
        let restaurant = restaurants
            .create_restaurant(payload("a@example.com", "5550000001", None), Onboarding::SelfService)
            .await
            .unwrap();

        let edited = restaurants
            .edit_restaurant(
                restaurant.id,
                EditRestaurantPayload {
                    owner_name: Some("Nonno".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.owner_name, "Nonno");
        assert_eq!(edited.email, restaurant.email);
        assert_eq!(edited.password_hash, restaurant.password_hash);
    }

    #[tokio::test]
    async fn decommission_removes_everything_of_the_tenant() {
        let store = MemoryStore::new();
        let restaurants = service(&store);
        let restaurant = restaurants
            .create_restaurant(payload("a@example.com", "5550000001", None), Onboarding::SelfService)
            .await
            .unwrap();
        let survivor = restaurants
            .create_restaurant(payload("b@example.com", "5550000002", None), Onboarding::SelfService)
            .await
            .unwrap();

        restaurants
            .add_restaurant_admin(
                restaurant.id,
                CreateRestaurantAdminPayload {
                    username: "gerente".to_string(),
                    email: "gerente@example.com".to_string(),
                    password: "segredo1".to_string(),
                },
            )
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        let mut customer_ids = Vec::new();
        for (i, target) in [restaurant.id, restaurant.id, survivor.id].into_iter().enumerate() {
            let customer = tx
                .insert_customer(&CreateCustomerPayload {
                    restaurant_id: target,
                    email: format!("c{}@example.com", i),
                    first_name: "Ana".to_string(),
                    last_name: "Lima".to_string(),
                    gender: Gender::Others,
                    dob: NaiveDate::from_ymd_opt(2000, 2, 29).unwrap(),
                    phone_number: format!("555111000{}", i),
                    address: "Rua G, 7".to_string(),
                    city: "Recife".to_string(),
                    state: "PE".to_string(),
                    zip_code: "50000000".to_string(),
                    agree_promotional_emails: false,
                    agree_data_sharing: false,
                })
                .await
                .unwrap();
            tx.append_ledger_entry(&NewLedgerEntry::new(customer.id, target, 10, PointsType::Add))
                .await
                .unwrap();
            tx.append_audit_entry(&NewAuditLogEntry::sign_up(customer.id, target))
                .await
                .unwrap();
            customer_ids.push(customer.id);
        }
        tx.commit().await.unwrap();

        let report = restaurants.decommission_restaurant(restaurant.id).await.unwrap();
        assert_eq!(
            report,
            DecommissionReport {
                admins: 1,
                customers: 2,
                ledger_entries: 2,
                audit_entries: 2,
            }
        );

        let err = restaurants.get_restaurant(restaurant.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let mut conn = store.connect().await.unwrap();
        assert!(conn.find_customer(customer_ids[0]).await.unwrap().is_none());
        assert!(conn.find_restaurant_admin_by_email("gerente@example.com").await.unwrap().is_none());

        // O outro tenant fica intacto
        let summary = restaurants.get_restaurant(survivor.id).await.unwrap();
        assert_eq!(summary.total_points, 10);
        assert!(conn.find_customer(customer_ids[2]).await.unwrap().is_some());

        let err = restaurants.decommission_restaurant(restaurant.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn blocked_decommission_times_out() {
        let store = MemoryStore::new();
        let restaurants = service(&store);
        let restaurant = restaurants
            .create_restaurant(payload("a@example.com", "5550000001", None), Onboarding::SelfService)
            .await
            .unwrap();

        // Bloqueado por outra unidade até estourar o prazo
        let short = RestaurantService::new(Arc::new(store.clone()), Duration::from_millis(50));
        let held = store.begin().await.unwrap();
        let err = short.decommission_restaurant(restaurant.id).await.unwrap_err();
        assert!(matches!(err, AppError::Timeout));
        drop(held);

        assert!(restaurants.get_restaurant(restaurant.id).await.is_ok());
    }

    #[tokio::test]
    async fn failure_midway_through_decommission_rolls_everything_back() {
        let store = MemoryStore::new();
        let restaurants = service(&store);
        let restaurant = restaurants
            .create_restaurant(payload("a@example.com", "5550000001", None), Onboarding::SelfService)
            .await
            .unwrap();
        restaurants
            .add_restaurant_admin(
                restaurant.id,
                CreateRestaurantAdminPayload {
                    username: "gerente".to_string(),
                    email: "gerente@example.com".to_string(),
                    password: "segredo1".to_string(),
                },
            )
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        let customer = tx
            .insert_customer(&CreateCustomerPayload {
                restaurant_id: restaurant.id,
                email: "ana@example.com".to_string(),
                first_name: "Ana".to_string(),
                last_name: "Lima".to_string(),
                gender: Gender::Female,
                dob: NaiveDate::from_ymd_opt(1995, 1, 10).unwrap(),
                phone_number: "5551110009".to_string(),
                address: "Rua G, 7".to_string(),
                city: "Recife".to_string(),
                state: "PE".to_string(),
                zip_code: "50000000".to_string(),
                agree_promotional_emails: false,
                agree_data_sharing: false,
            })
            .await
            .unwrap();
        tx.append_ledger_entry(&NewLedgerEntry::new(customer.id, restaurant.id, 40, PointsType::Add))
            .await
            .unwrap();
        tx.append_audit_entry(&NewAuditLogEntry::sign_up(customer.id, restaurant.id))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        // Admins, clientes e livro-razão já saíram quando a auditoria falha
        store.fail_audit_deletes(true);
        let err = restaurants.decommission_restaurant(restaurant.id).await.unwrap_err();
        assert!(matches!(err, AppError::StorageError(_)));
        store.fail_audit_deletes(false);

        let summary = restaurants.get_restaurant(restaurant.id).await.unwrap();
        assert_eq!(summary.total_points, 40);

        let mut conn = store.connect().await.unwrap();
        assert!(conn.find_customer(customer.id).await.unwrap().is_some());
        assert!(conn.find_restaurant_admin_by_email("gerente@example.com").await.unwrap().is_some());
        let (_, audit_total) = conn
            .list_audit_entries(customer.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(audit_total, 1);
        drop(conn);

        // Sem a falha, a mesma operação conclui
        let report = restaurants.decommission_restaurant(restaurant.id).await.unwrap();
        assert_eq!(report.ledger_entries, 1);
    }

    #[tokio::test]
    async fn blocked_status_change_times_out() {
        let store = MemoryStore::new();
        let restaurant = service(&store)
            .create_restaurant(payload("a@example.com", "5550000001", None), Onboarding::SelfService)
            .await
            .unwrap();

        let short = RestaurantService::new(Arc::new(store.clone()), Duration::from_millis(50));
        let held = store.begin().await.unwrap();
        let err = short
            .set_status(restaurant.id, RestaurantStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout));
        drop(held);

        let summary = service(&store).get_restaurant(restaurant.id).await.unwrap();
        assert_eq!(summary.restaurant.status, RestaurantStatus::Pending);
    }

    #[tokio::test]
    async fn restaurant_email_cannot_shadow_staff_login() {
        let store = MemoryStore::new();
        let restaurants = service(&store);
        let first = restaurants
            .create_restaurant(payload("a@example.com", "5550000001", None), Onboarding::SelfService)
            .await
            .unwrap();
        restaurants
            .add_restaurant_admin(
                first.id,
                CreateRestaurantAdminPayload {
                    username: "gerente".to_string(),
                    email: "gerente@example.com".to_string(),
                    password: "segredo1".to_string(),
                },
            )
            .await
            .unwrap();

        let err = restaurants
            .create_restaurant(payload("gerente@example.com", "5550000002", None), Onboarding::SelfService)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));

        let err = restaurants
            .edit_restaurant(
                first.id,
                EditRestaurantPayload {
                    email: Some("gerente@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }
}
