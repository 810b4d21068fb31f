// src/models/ledger.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::pagination::PageRequest;

/// Teto de um único lançamento. Mantém as somas por grupo longe do limite de `i64`.
pub const MAX_POINTS_PER_ENTRY: i64 = 1_000_000_000;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "points_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
pub enum PointsType {
    Add,
    Redeem,
}

impl PointsType {
    /// Resgates são gravados negativos no livro-razão.
    pub fn signed(self, points: i64) -> i64 {
        match self {
            PointsType::Add => points,
            PointsType::Redeem => -points,
        }
    }
}

// --- Lançamento (imutável) ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,

    /// Positivo = crédito, Negativo = resgate
    #[schema(example = -80)]
    pub points: i64,

    #[serde(rename = "type")]
    pub kind: PointsType,

    pub created_at: DateTime<Utc>,
}

/// Dados para um novo lançamento. O sinal é derivado do tipo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub points: i64,
    pub kind: PointsType,
}

impl NewLedgerEntry {
    /// `magnitude` deve ser positivo; o sinal segue `kind`.
    pub fn new(customer_id: Uuid, restaurant_id: Uuid, magnitude: i64, kind: PointsType) -> Self {
        Self {
            customer_id,
            restaurant_id,
            points: kind.signed(magnitude),
            kind,
        }
    }
}

/// Corpo de `POST /restaurantAdmin/addReward`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddRewardPayload {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,

    #[validate(range(min = 1, max = 1000000000, message = "A quantidade de pontos deve estar entre 1 e 1000000000."))]
    #[schema(example = 50)]
    pub points: i64,

    #[serde(rename = "type")]
    pub kind: PointsType,

    /// Destino da notificação; ausente = e-mail cadastrado do cliente
    #[validate(email(message = "Formato de e-mail inválido."))]
    pub email: Option<String>,
}

/// Listagem do livro-razão de um cliente (corpo ou query string)
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RewardPointsQuery {
    pub id: Uuid,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl RewardPointsQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Escopo de agregação do saldo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceScope {
    Customer(Uuid),
    Restaurant(Uuid),
}

/// Linha do agrupamento por tipo (`GROUP BY kind`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct PointsTotal {
    pub kind: PointsType,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointsBalance {
    /// Soma dos créditos
    pub added: i64,
    /// Magnitude dos resgates (não negativa)
    pub redeemed: i64,
    /// Soma de todos os lançamentos com sinal
    pub available: i64,
}

impl PointsBalance {
    pub fn from_totals(totals: &[PointsTotal]) -> Self {
        // Satura em vez de estourar; o coordenador não deixa chegar aqui
        let sum_of = |kind: PointsType| -> i64 {
            totals
                .iter()
                .filter(|t| t.kind == kind)
                .fold(0i64, |acc, t| acc.saturating_add(t.total))
        };

        let added = sum_of(PointsType::Add);
        let redeemed_signed = sum_of(PointsType::Redeem);

        Self {
            added,
            redeemed: redeemed_signed.saturating_neg(),
            // Uma única soma: não recalculamos a partir dos grupos com outra convenção
            available: added.saturating_add(redeemed_signed),
        }
    }
}
