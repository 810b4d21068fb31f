// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{Principal, Role},
};

/// 1. O Trait que define qual papel uma rota exige
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> Role;
}

/// 2. O Extractor (Guardião). Entrega o Principal já checado.
pub struct RequireRole<T>(pub Principal, pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(principal) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if principal.role != T::role() {
            tracing::warn!(subject_id = %principal.subject_id, role = ?principal.role, "Papel sem acesso à rota");
            return Err(AppError::Forbidden(
                "Seu perfil não tem acesso a esta operação.".to_string(),
            ));
        }

        Ok(RequireRole(principal, PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct ProductAdminOnly;
impl RoleDef for ProductAdminOnly {
    fn role() -> Role { Role::ProductAdmin }
}

pub struct RestaurantAdminOnly;
impl RoleDef for RestaurantAdminOnly {
    fn role() -> Role { Role::RestaurantAdmin }
}
