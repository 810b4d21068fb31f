// src/services/auth.rs

use std::{sync::Arc, time::Duration};

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LoyaltyStore, UnitOfWork},
    models::{
        auth::{
            Claims, CreateProductAdminPayload, LoginPayload, NewProductAdmin, Principal, ProductAdmin,
            ProductAdminAuthResponse, RestaurantAuthResponse, Role,
        },
        restaurant::{Restaurant, RestaurantStatus},
    },
    services::bounded,
};

/// bcrypt é CPU-bound: roda fora das threads do runtime.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

/// Só restaurantes aceitos podem entrar no painel.
fn ensure_restaurant_active(restaurant: &Restaurant) -> Result<(), AppError> {
    match restaurant.status {
        RestaurantStatus::Accepted => Ok(()),
        RestaurantStatus::Pending => Err(AppError::RestaurantPending),
        RestaurantStatus::Rejected => Err(AppError::RestaurantRejected),
    }
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn LoyaltyStore>,
    jwt_secret: String,
    jwt_ttl_hours: i64,
    tx_timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn LoyaltyStore>,
        jwt_secret: String,
        jwt_ttl_hours: i64,
        tx_timeout: Duration,
    ) -> Self {
        Self {
            store,
            jwt_secret,
            jwt_ttl_hours,
            tx_timeout,
        }
    }

    pub async fn register_product_admin(
        &self,
        payload: CreateProductAdminPayload,
    ) -> Result<ProductAdmin, AppError> {
        // Hash fora da transação: não toca no banco
        let password_hash = hash_password(&payload.password).await?;
        let new = NewProductAdmin {
            username: payload.username,
            email: payload.email,
            password_hash,
            phone: payload.phone,
        };

        let admin = bounded(self.tx_timeout, "register_product_admin", self.store_product_admin(&new)).await?;

        tracing::info!(admin_id = %admin.id, "Administrador do produto criado");
        Ok(admin)
    }

    async fn store_product_admin(&self, new: &NewProductAdmin) -> Result<ProductAdmin, AppError> {
        let mut tx = self.store.begin().await?;
        if tx.find_product_admin_by_email(&new.email).await?.is_some() {
            return Err(AppError::AlreadyExists(
                "Já existe um administrador com este e-mail.".to_string(),
            ));
        }

        let admin = tx.insert_product_admin(new).await?;
        tx.commit().await?;
        Ok(admin)
    }

    pub async fn login_product_admin(&self, payload: &LoginPayload) -> Result<ProductAdminAuthResponse, AppError> {
        let mut conn = self.store.connect().await?;
        let admin = conn
            .find_product_admin_by_email(&payload.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&payload.password, &admin.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(admin.id, Role::ProductAdmin, None)?;
        Ok(ProductAdminAuthResponse {
            token,
            product_admin: admin,
        })
    }

    /// Login do painel do restaurante: primeiro a conta do próprio
    /// restaurante, depois os administradores vinculados a ele.
    pub async fn login_restaurant(&self, payload: &LoginPayload) -> Result<RestaurantAuthResponse, AppError> {
        let mut conn = self.store.connect().await?;

        if let Some(restaurant) = conn.find_restaurant_by_email(&payload.email).await? {
            if !verify_password(&payload.password, &restaurant.password_hash).await? {
                return Err(AppError::InvalidCredentials);
            }
            ensure_restaurant_active(&restaurant)?;
            return self.restaurant_session(restaurant.id, restaurant);
        }

        let admin = conn
            .find_restaurant_admin_by_email(&payload.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        if !verify_password(&payload.password, &admin.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let restaurant = self.restaurant_of(&mut conn, admin.restaurant_id).await?;
        ensure_restaurant_active(&restaurant)?;
        self.restaurant_session(admin.id, restaurant)
    }

    async fn restaurant_of(
        &self,
        conn: &mut Box<dyn UnitOfWork>,
        restaurant_id: Uuid,
    ) -> Result<Restaurant, AppError> {
        conn.find_restaurant(restaurant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Restaurante"))
    }

    fn restaurant_session(&self, subject_id: Uuid, restaurant: Restaurant) -> Result<RestaurantAuthResponse, AppError> {
        let token = self.create_token(subject_id, Role::RestaurantAdmin, Some(restaurant.id))?;
        Ok(RestaurantAuthResponse {
            token,
            restaurant_id: restaurant.id,
            restaurant_name: restaurant.restaurant_name,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<Principal, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        // Token de restaurante sem restaurante é inútil
        if claims.role == Role::RestaurantAdmin && claims.restaurant_id.is_none() {
            return Err(AppError::InvalidToken);
        }

        Ok(Principal {
            subject_id: claims.sub,
            role: claims.role,
            restaurant_id: claims.restaurant_id,
        })
    }

    pub fn create_token(
        &self,
        subject_id: Uuid,
        role: Role,
        restaurant_id: Option<Uuid>,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.jwt_ttl_hours);

        let claims = Claims {
            sub: subject_id,
            role,
            restaurant_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
