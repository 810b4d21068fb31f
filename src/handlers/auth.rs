// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        auth::{
            CreateProductAdminPayload, LoginPayload, ProductAdmin, ProductAdminAuthResponse,
            RestaurantAuthResponse,
        },
        restaurant::{CreateRestaurantPayload, Restaurant},
    },
    services::restaurant_service::Onboarding,
};

// POST /api/v1/auth/createAdmin
#[utoipa::path(
    post,
    path = "/api/v1/auth/createAdmin",
    tag = "Auth",
    request_body = CreateProductAdminPayload,
    responses(
        (status = 201, description = "Administrador do produto criado", body = ProductAdmin),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn create_admin(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductAdminPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let admin = app_state.auth_service.register_product_admin(payload).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

// POST /api/v1/auth/validateAdmin
#[utoipa::path(
    post,
    path = "/api/v1/auth/validateAdmin",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado", body = ProductAdminAuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn validate_admin(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<ProductAdminAuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let response = app_state.auth_service.login_product_admin(&payload).await?;
    Ok(Json(response))
}

// POST /api/v1/auth/validateRestaurantAdmin
#[utoipa::path(
    post,
    path = "/api/v1/auth/validateRestaurantAdmin",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado", body = RestaurantAuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Cadastro pendente ou rejeitado")
    )
)]
pub async fn validate_restaurant_admin(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<RestaurantAuthResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let response = app_state.auth_service.login_restaurant(&payload).await?;
    Ok(Json(response))
}

// POST /api/v1/auth/external/addRestaurant
#[utoipa::path(
    post,
    path = "/api/v1/auth/external/addRestaurant",
    tag = "Auth",
    request_body = CreateRestaurantPayload,
    responses(
        (status = 201, description = "Cadastro recebido, aguardando aprovação", body = Restaurant),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail ou telefone já cadastrado")
    )
)]
pub async fn add_restaurant_external(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateRestaurantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let restaurant = app_state
        .restaurant_service
        .create_restaurant(payload, Onboarding::SelfService)
        .await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}
