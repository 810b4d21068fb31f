// src/handlers/common.rs

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    common::{error::AppError, pagination::Page},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        customer::{CustomerProfile, ListCustomersPayload},
        ledger::{LedgerEntry, RewardPointsQuery},
    },
};

// POST /api/v1/common/getCustomers
#[utoipa::path(
    post,
    path = "/api/v1/common/getCustomers",
    tag = "Common",
    request_body = ListCustomersPayload,
    responses(
        (status = 200, description = "Clientes paginados com saldo", body = Page<CustomerProfile>),
        (status = 403, description = "Restaurante de outro tenant")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customers(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(payload): Json<ListCustomersPayload>,
) -> Result<Json<Page<CustomerProfile>>, AppError> {
    let page = app_state
        .customer_service
        .list_customers(&principal, payload.filter(), payload.page_request())
        .await?;
    Ok(Json(page))
}

// POST /api/v1/common/getRewardPoints
#[utoipa::path(
    post,
    path = "/api/v1/common/getRewardPoints",
    tag = "Common",
    request_body = RewardPointsQuery,
    responses(
        (status = 200, description = "Lançamentos do cliente, mais novos primeiro", body = Page<LedgerEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_reward_points(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Json(query): Json<RewardPointsQuery>,
) -> Result<Json<Page<LedgerEntry>>, AppError> {
    let page = app_state
        .ledger_service
        .list_for_principal(&principal, query.id, query.page_request())
        .await?;
    Ok(Json(page))
}

// GET /api/v1/rewardPoints?id=&page=&limit=
#[utoipa::path(
    get,
    path = "/api/v1/rewardPoints",
    tag = "Common",
    params(RewardPointsQuery),
    responses(
        (status = 200, description = "Lançamentos do cliente, mais novos primeiro", body = Page<LedgerEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn reward_points(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    Query(query): Query<RewardPointsQuery>,
) -> Result<Json<Page<LedgerEntry>>, AppError> {
    let page = app_state
        .ledger_service
        .list_for_principal(&principal, query.id, query.page_request())
        .await?;
    Ok(Json(page))
}
