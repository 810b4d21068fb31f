// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ledger::PointsType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "customer_action", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "camelCase")]
pub enum AuditAction {
    SignUp,
    AddPoints,
    RedeemPoints,
    DeleteProfile,
}

// Histórico de ações sobre um cliente. Só recebe INSERT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub action: AuditAction,
    #[schema(example = "Added reward points")]
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditLogEntry {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub action: AuditAction,
    pub details: String,
}

impl NewAuditLogEntry {
    pub fn sign_up(customer_id: Uuid, restaurant_id: Uuid) -> Self {
        Self {
            customer_id,
            restaurant_id,
            action: AuditAction::SignUp,
            details: "Signed up the user".to_string(),
        }
    }

    pub fn points(customer_id: Uuid, restaurant_id: Uuid, kind: PointsType) -> Self {
        let (action, details) = match kind {
            PointsType::Add => (AuditAction::AddPoints, "Added reward points"),
            PointsType::Redeem => (AuditAction::RedeemPoints, "Redeemed points"),
        };
        Self {
            customer_id,
            restaurant_id,
            action,
            details: details.to_string(),
        }
    }

    pub fn delete_profile(customer_id: Uuid, restaurant_id: Uuid) -> Self {
        Self {
            customer_id,
            restaurant_id,
            action: AuditAction::DeleteProfile,
            details: "Removed the user from the reward program".to_string(),
        }
    }
}
