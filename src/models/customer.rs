// src/models/customer.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::pagination::PageRequest, models::ledger::PointsBalance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "gender", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Others,
}

// --- CLIENTE (membro do programa de um único restaurante) ---
// Não existe saldo em cache aqui: o livro-razão é a única fonte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub restaurant_id: Uuid,

    #[schema(example = "Maria")]
    pub first_name: String,
    #[schema(example = "Silva")]
    pub last_name: String,
    pub gender: Gender,

    #[schema(value_type = String, format = Date, example = "1990-05-20")]
    pub dob: NaiveDate,

    #[schema(example = "5551234567")]
    pub phone_number: String,
    #[schema(example = "maria@email.com")]
    pub email: String,

    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,

    pub agree_promotional_emails: bool,
    pub agree_data_sharing: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    pub restaurant_id: Uuid,

    #[validate(email(message = "Formato de e-mail inválido."))]
    pub email: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub first_name: String,

    #[validate(length(min = 1, message = "O sobrenome é obrigatório."))]
    pub last_name: String,

    pub gender: Gender,

    #[schema(value_type = String, format = Date, example = "1990-05-20")]
    pub dob: NaiveDate,

    #[validate(length(equal = 10, message = "O telefone deve ter exatamente 10 caracteres."))]
    pub phone_number: String,

    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,
    #[validate(length(min = 1, message = "A cidade é obrigatória."))]
    pub city: String,
    #[validate(length(min = 1, message = "O estado é obrigatório."))]
    pub state: String,
    #[validate(length(min = 1, message = "O CEP é obrigatório."))]
    pub zip_code: String,

    #[serde(default)]
    pub agree_promotional_emails: bool,
    #[serde(default)]
    pub agree_data_sharing: bool,
}

/// Atualização parcial: só os campos presentes são gravados.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    #[validate(length(min = 1))]
    pub first_name: Option<String>,
    #[validate(length(min = 1))]
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    #[schema(value_type = Option<String>, format = Date)]
    pub dob: Option<NaiveDate>,
    #[validate(length(equal = 10, message = "O telefone deve ter exatamente 10 caracteres."))]
    pub phone_number: Option<String>,
    #[validate(email(message = "Formato de e-mail inválido."))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub agree_promotional_emails: Option<bool>,
    pub agree_data_sharing: Option<bool>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.gender.is_none()
            && self.dob.is_none()
            && self.phone_number.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
            && self.agree_promotional_emails.is_none()
            && self.agree_data_sharing.is_none()
    }

    /// Aplica o patch em memória (usado pelo store em memória).
    pub fn apply_to(&self, customer: &mut Customer) {
        if let Some(v) = &self.first_name { customer.first_name = v.clone(); }
        if let Some(v) = &self.last_name { customer.last_name = v.clone(); }
        if let Some(v) = self.gender { customer.gender = v; }
        if let Some(v) = self.dob { customer.dob = v; }
        if let Some(v) = &self.phone_number { customer.phone_number = v.clone(); }
        if let Some(v) = &self.email { customer.email = v.clone(); }
        if let Some(v) = &self.address { customer.address = v.clone(); }
        if let Some(v) = &self.city { customer.city = v.clone(); }
        if let Some(v) = &self.state { customer.state = v.clone(); }
        if let Some(v) = &self.zip_code { customer.zip_code = v.clone(); }
        if let Some(v) = self.agree_promotional_emails { customer.agree_promotional_emails = v; }
        if let Some(v) = self.agree_data_sharing { customer.agree_data_sharing = v; }
    }
}

/// Filtro da listagem de clientes
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub restaurant_id: Option<Uuid>,
    /// Busca parcial, sem diferenciar maiúsculas
    pub phone: Option<String>,
}

/// Corpo de `POST /common/getCustomers`
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListCustomersPayload {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub restaurant_id: Option<Uuid>,
    pub phone: Option<String>,
}

impl ListCustomersPayload {
    pub fn filter(&self) -> CustomerFilter {
        CustomerFilter {
            restaurant_id: self.restaurant_id,
            phone: self.phone.clone().filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Cliente com o saldo calculado a partir do livro-razão
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub customer: Customer,
    pub total_points: i64,
    pub total_added_points: i64,
    pub total_redeemed_points: i64,
}

impl CustomerProfile {
    pub fn new(customer: Customer, balance: PointsBalance) -> Self {
        Self {
            customer,
            total_points: balance.available,
            total_added_points: balance.added,
            total_redeemed_points: balance.redeemed,
        }
    }
}
