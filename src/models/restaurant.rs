// src/models/restaurant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::pagination::PageRequest, models::ledger::PointsBalance};

// Estado do fluxo de aprovação. Qualquer estado pode ir para qualquer outro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "restaurant_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum RestaurantStatus {
    Pending,
    #[serde(alias = "accept")]
    Accepted,
    #[serde(alias = "reject")]
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryContactDetails {
    #[validate(length(min = 1, message = "O nome do contato é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "O endereço do contato é obrigatório."))]
    pub address: String,
    #[validate(email(message = "Formato de e-mail do contato principal inválido."))]
    pub email: String,
}

// ---
// Restaurant (o Tenant)
// ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    #[schema(example = "Cantina da Nona")]
    pub restaurant_name: String,
    pub address: String,
    pub llc: String,
    pub phone_number: String,
    pub email: String,
    pub owner_name: String,

    #[schema(value_type = PrimaryContactDetails)]
    pub primary_contact: Json<PrimaryContactDetails>,

    pub status: RestaurantStatus,
    pub agreement_accepted: bool,
    pub created_by: Option<Uuid>,

    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestaurantPayload {
    #[validate(length(min = 1, message = "O nome do restaurante é obrigatório."))]
    pub restaurant_name: String,

    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,

    #[validate(length(min = 1, message = "O LLC é obrigatório."))]
    pub llc: String,

    #[validate(length(equal = 10, message = "O telefone deve ter exatamente 10 caracteres."))]
    pub phone_number: String,

    #[validate(email(message = "Formato de e-mail inválido."))]
    pub email: String,

    #[validate(length(min = 1, message = "O nome do proprietário é obrigatório."))]
    pub owner_name: String,

    #[validate(nested)]
    pub primary_contact_details: PrimaryContactDetails,

    pub agreement_accepted: bool,

    /// Ausente = Pending
    pub status: Option<RestaurantStatus>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

/// Dados prontos para INSERT (senha já com hash)
#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub restaurant_name: String,
    pub address: String,
    pub llc: String,
    pub phone_number: String,
    pub email: String,
    pub owner_name: String,
    pub primary_contact: PrimaryContactDetails,
    pub status: RestaurantStatus,
    pub agreement_accepted: bool,
    pub created_by: Option<Uuid>,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditRestaurantPayload {
    #[validate(length(min = 1))]
    pub restaurant_name: Option<String>,
    pub address: Option<String>,
    pub llc: Option<String>,
    #[validate(length(equal = 10, message = "O telefone deve ter exatamente 10 caracteres."))]
    pub phone_number: Option<String>,
    #[validate(email(message = "Formato de e-mail inválido."))]
    pub email: Option<String>,
    pub owner_name: Option<String>,
    #[validate(nested)]
    pub primary_contact_details: Option<PrimaryContactDetails>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
}

/// Patch de colunas (senha já com hash)
#[derive(Debug, Clone, Default)]
pub struct RestaurantPatch {
    pub restaurant_name: Option<String>,
    pub address: Option<String>,
    pub llc: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub owner_name: Option<String>,
    pub primary_contact: Option<PrimaryContactDetails>,
    pub password_hash: Option<String>,
}

impl RestaurantPatch {
    pub fn is_empty(&self) -> bool {
        self.restaurant_name.is_none()
            && self.address.is_none()
            && self.llc.is_none()
            && self.phone_number.is_none()
            && self.email.is_none()
            && self.owner_name.is_none()
            && self.primary_contact.is_none()
            && self.password_hash.is_none()
    }

    pub fn apply_to(&self, restaurant: &mut Restaurant) {
        if let Some(v) = &self.restaurant_name { restaurant.restaurant_name = v.clone(); }
        if let Some(v) = &self.address { restaurant.address = v.clone(); }
        if let Some(v) = &self.llc { restaurant.llc = v.clone(); }
        if let Some(v) = &self.phone_number { restaurant.phone_number = v.clone(); }
        if let Some(v) = &self.email { restaurant.email = v.clone(); }
        if let Some(v) = &self.owner_name { restaurant.owner_name = v.clone(); }
        if let Some(v) = &self.primary_contact { restaurant.primary_contact = Json(v.clone()); }
        if let Some(v) = &self.password_hash { restaurant.password_hash = v.clone(); }
    }
}

/// Filtros da listagem do administrador do produto
#[derive(Debug, Clone, Default)]
pub struct RestaurantFilter {
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub accepted_only: bool,
    /// Trecho do nome, sem diferenciar maiúsculas
    pub name: Option<String>,
}

/// Corpo de `POST /productAdmin/getRestaurants`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListRestaurantsPayload {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_accepted: bool,
    pub name: Option<String>,
}

impl ListRestaurantsPayload {
    pub fn filter(&self) -> RestaurantFilter {
        RestaurantFilter {
            created_from: self.start_date,
            created_to: self.end_date,
            accepted_only: self.is_accepted,
            name: self.name.clone().filter(|n| !n.trim().is_empty()),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RestaurantIdPayload {
    pub id: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRestaurantStatusPayload {
    pub restaurant_id: Uuid,
    pub status: RestaurantStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSummary {
    pub restaurant: Restaurant,
    pub total_points: i64,
    pub total_added_points: i64,
    pub redeemed_points: i64,
}

impl RestaurantSummary {
    pub fn new(restaurant: Restaurant, balance: PointsBalance) -> Self {
        Self {
            restaurant,
            total_points: balance.available,
            total_added_points: balance.added,
            redeemed_points: balance.redeemed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_legacy_verbs() {
        let accepted: RestaurantStatus = serde_json::from_str("\"accept\"").unwrap();
        let rejected: RestaurantStatus = serde_json::from_str("\"reject\"").unwrap();
        let pending: RestaurantStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(accepted, RestaurantStatus::Accepted);
        assert_eq!(rejected, RestaurantStatus::Rejected);
        assert_eq!(pending, RestaurantStatus::Pending);
    }

    #[test]
    fn blank_name_filter_is_ignored() {
        let payload: ListRestaurantsPayload =
            serde_json::from_str(r#"{"name": "  ", "isAccepted": true}"#).unwrap();
        let filter = payload.filter();
        assert!(filter.name.is_none());
        assert!(filter.accepted_only);
        assert_eq!(payload.page_request(), PageRequest::default());
    }
}
