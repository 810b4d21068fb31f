// src/handlers/restaurant_admin.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PaginationParams},
    },
    config::AppState,
    middleware::rbac::{RequireRole, RestaurantAdminOnly},
    models::{
        audit::AuditLogEntry,
        customer::{CreateCustomerPayload, Customer, CustomerPatch, CustomerProfile},
        ledger::{AddRewardPayload, LedgerEntry},
    },
};

// POST /api/v1/restaurantAdmin/addCustomer
#[utoipa::path(
    post,
    path = "/api/v1/restaurantAdmin/addCustomer",
    tag = "Restaurant Admin",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente cadastrado no programa", body = Customer),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail ou telefone já cadastrado neste restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_customer(
    State(app_state): State<AppState>,
    RequireRole(principal, _): RequireRole<RestaurantAdminOnly>,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let customer = app_state.customer_service.create_customer(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

// POST /api/v1/restaurantAdmin/addReward (e o atalho POST /api/v1/reward)
#[utoipa::path(
    post,
    path = "/api/v1/restaurantAdmin/addReward",
    tag = "Restaurant Admin",
    request_body = AddRewardPayload,
    responses(
        (status = 201, description = "Lançamento registrado", body = LedgerEntry),
        (status = 400, description = "Dados inválidos ou saldo insuficiente"),
        (status = 404, description = "Cliente não encontrado neste restaurante"),
        (status = 409, description = "Operação concorrente, tente novamente"),
        (status = 503, description = "Tempo limite excedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_reward(
    State(app_state): State<AppState>,
    RequireRole(principal, _): RequireRole<RestaurantAdminOnly>,
    Json(payload): Json<AddRewardPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    principal.ensure_restaurant_access(payload.restaurant_id)?;

    let entry = app_state.reward_service.grant_or_redeem(payload.into()).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

// GET /api/v1/restaurantAdmin/getCustomer/{id} (e o atalho GET /api/v1/customer/{id})
#[utoipa::path(
    get,
    path = "/api/v1/restaurantAdmin/getCustomer/{id}",
    tag = "Restaurant Admin",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente com o saldo de pontos", body = CustomerProfile),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    RequireRole(principal, _): RequireRole<RestaurantAdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerProfile>, AppError> {
    let profile = app_state.customer_service.get_profile(&principal, id).await?;
    Ok(Json(profile))
}

// PUT /api/v1/restaurantAdmin/editCustomer/{id}
#[utoipa::path(
    put,
    path = "/api/v1/restaurantAdmin/editCustomer/{id}",
    tag = "Restaurant Admin",
    request_body = CustomerPatch,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "E-mail ou telefone já cadastrado neste restaurante")
    ),
    security(("api_jwt" = []))
)]
pub async fn edit_customer(
    State(app_state): State<AppState>,
    RequireRole(principal, _): RequireRole<RestaurantAdminOnly>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CustomerPatch>,
) -> Result<Json<Customer>, AppError> {
    patch.validate().map_err(AppError::ValidationError)?;

    let customer = app_state.customer_service.edit_customer(&principal, id, patch).await?;
    Ok(Json(customer))
}

// DELETE /api/v1/restaurantAdmin/deleteCustomer/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/restaurantAdmin/deleteCustomer/{id}",
    tag = "Restaurant Admin",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente removido do programa"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    RequireRole(principal, _): RequireRole<RestaurantAdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.customer_service.remove_customer(&principal, id).await?;
    Ok(Json(json!({ "message": "Cliente removido do programa de recompensas." })))
}

// POST /api/v1/restaurantAdmin/customerLogs/{id}
#[utoipa::path(
    post,
    path = "/api/v1/restaurantAdmin/customerLogs/{id}",
    tag = "Restaurant Admin",
    request_body = PaginationParams,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Histórico de ações do cliente", body = Page<AuditLogEntry>),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn customer_logs(
    State(app_state): State<AppState>,
    RequireRole(principal, _): RequireRole<RestaurantAdminOnly>,
    Path(id): Path<Uuid>,
    Json(pagination): Json<PaginationParams>,
) -> Result<Json<Page<AuditLogEntry>>, AppError> {
    let logs = app_state
        .customer_service
        .customer_logs(&principal, id, pagination.into())
        .await?;
    Ok(Json(logs))
}

// GET /api/v1/restaurantAdmin/rewardPoints
#[utoipa::path(
    get,
    path = "/api/v1/restaurantAdmin/rewardPoints",
    tag = "Restaurant Admin",
    params(PaginationParams),
    responses(
        (status = 200, description = "Lançamentos do restaurante, mais novos primeiro", body = Page<LedgerEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn restaurant_ledger(
    State(app_state): State<AppState>,
    RequireRole(principal, _): RequireRole<RestaurantAdminOnly>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Page<LedgerEntry>>, AppError> {
    // O validate_token garante que todo token de restaurante tem restaurante
    let restaurant_id = principal
        .restaurant_scope()
        .ok_or_else(|| AppError::Forbidden("Token sem restaurante vinculado.".to_string()))?;

    let page = app_state
        .ledger_service
        .list_by_restaurant(restaurant_id, pagination.into())
        .await?;
    Ok(Json(page))
}
