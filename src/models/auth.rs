// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    ProductAdmin,
    RestaurantAdmin,
}

// Administrador do produto (onboarding de restaurantes)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductAdmin {
    pub id: Uuid,
    pub username: String,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProductAdmin {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
}

// Funcionário com acesso ao painel de um restaurante
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantAdmin {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub username: String,
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRestaurantAdmin {
    pub restaurant_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

// Dados para criação de um administrador do produto
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductAdminPayload {
    #[validate(length(min = 1, max = 40, message = "O nome deve ter até 40 caracteres."))]
    pub username: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(equal = 10, message = "O telefone deve ter exatamente 10 caracteres."))]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRestaurantAdminPayload {
    #[validate(length(min = 1, message = "O nome de usuário é obrigatório."))]
    pub username: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID de quem autenticou)
    pub role: Role,
    /// Restaurante ao qual o token dá acesso (só para RestaurantAdmin)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<Uuid>,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

/// Identidade verificada de quem fez a requisição
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub subject_id: Uuid,
    pub role: Role,
    pub restaurant_id: Option<Uuid>,
}

impl Principal {
    /// Administradores do produto enxergam todos os tenants;
    /// administradores de restaurante só o próprio.
    pub fn can_access_restaurant(&self, restaurant_id: Uuid) -> bool {
        match self.role {
            Role::ProductAdmin => true,
            Role::RestaurantAdmin => self.restaurant_id == Some(restaurant_id),
        }
    }

    /// Restaurante imposto pelo token, se houver
    pub fn restaurant_scope(&self) -> Option<Uuid> {
        match self.role {
            Role::ProductAdmin => None,
            Role::RestaurantAdmin => self.restaurant_id,
        }
    }

    pub fn ensure_restaurant_access(&self, restaurant_id: Uuid) -> Result<(), AppError> {
        if self.can_access_restaurant(restaurant_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Recurso pertence a outro restaurante.".to_string(),
            ))
        }
    }
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductAdminAuthResponse {
    pub token: String,
    pub product_admin: ProductAdmin,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantAuthResponse {
    pub token: String,
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restaurant_admin_is_scoped_to_own_tenant() {
        let own = Uuid::new_v4();
        let principal = Principal {
            subject_id: Uuid::new_v4(),
            role: Role::RestaurantAdmin,
            restaurant_id: Some(own),
        };
        assert!(principal.can_access_restaurant(own));
        assert!(!principal.can_access_restaurant(Uuid::new_v4()));
        assert_eq!(principal.restaurant_scope(), Some(own));
    }

    #[test]
    fn product_admin_sees_every_tenant() {
        let principal = Principal {
            subject_id: Uuid::new_v4(),
            role: Role::ProductAdmin,
            restaurant_id: None,
        };
        assert!(principal.can_access_restaurant(Uuid::new_v4()));
        assert_eq!(principal.restaurant_scope(), None);
    }
}
