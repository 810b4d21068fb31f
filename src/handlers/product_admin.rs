// src/handlers/product_admin.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Page},
    config::AppState,
    middleware::rbac::{ProductAdminOnly, RequireRole},
    models::{
        auth::{CreateRestaurantAdminPayload, RestaurantAdmin},
        restaurant::{
            CreateRestaurantPayload, EditRestaurantPayload, ListRestaurantsPayload, Restaurant,
            RestaurantIdPayload, RestaurantSummary, UpdateRestaurantStatusPayload,
        },
    },
    services::restaurant_service::{DecommissionReport, Onboarding},
};

// POST /api/v1/productAdmin/addRestaurant
#[utoipa::path(
    post,
    path = "/api/v1/productAdmin/addRestaurant",
    tag = "Product Admin",
    request_body = CreateRestaurantPayload,
    responses(
        (status = 201, description = "Restaurante criado", body = Restaurant),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail ou telefone já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_restaurant(
    State(app_state): State<AppState>,
    RequireRole(principal, _): RequireRole<ProductAdminOnly>,
    Json(payload): Json<CreateRestaurantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let restaurant = app_state
        .restaurant_service
        .create_restaurant(payload, Onboarding::ByProductAdmin(principal.subject_id))
        .await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

// POST /api/v1/productAdmin/getRestaurants
#[utoipa::path(
    post,
    path = "/api/v1/productAdmin/getRestaurants",
    tag = "Product Admin",
    request_body = ListRestaurantsPayload,
    responses(
        (status = 200, description = "Restaurantes paginados", body = Page<Restaurant>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_restaurants(
    State(app_state): State<AppState>,
    _: RequireRole<ProductAdminOnly>,
    Json(payload): Json<ListRestaurantsPayload>,
) -> Result<Json<Page<Restaurant>>, AppError> {
    let page = app_state
        .restaurant_service
        .list_restaurants(&payload.filter(), payload.page_request())
        .await?;
    Ok(Json(page))
}

// POST /api/v1/productAdmin/getRestaurant
#[utoipa::path(
    post,
    path = "/api/v1/productAdmin/getRestaurant",
    tag = "Product Admin",
    request_body = RestaurantIdPayload,
    responses(
        (status = 200, description = "Restaurante com o saldo de pontos", body = RestaurantSummary),
        (status = 404, description = "Restaurante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_restaurant(
    State(app_state): State<AppState>,
    _: RequireRole<ProductAdminOnly>,
    Json(payload): Json<RestaurantIdPayload>,
) -> Result<Json<RestaurantSummary>, AppError> {
    let summary = app_state.restaurant_service.get_restaurant(payload.id).await?;
    Ok(Json(summary))
}

// PUT /api/v1/productAdmin/editRestaurant/{id}
#[utoipa::path(
    put,
    path = "/api/v1/productAdmin/editRestaurant/{id}",
    tag = "Product Admin",
    request_body = EditRestaurantPayload,
    params(("id" = Uuid, Path, description = "ID do restaurante")),
    responses(
        (status = 200, description = "Restaurante atualizado", body = Restaurant),
        (status = 404, description = "Restaurante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn edit_restaurant(
    State(app_state): State<AppState>,
    _: RequireRole<ProductAdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EditRestaurantPayload>,
) -> Result<Json<Restaurant>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let restaurant = app_state.restaurant_service.edit_restaurant(id, payload).await?;
    Ok(Json(restaurant))
}

// POST /api/v1/productAdmin/updateRestaurant
#[utoipa::path(
    post,
    path = "/api/v1/productAdmin/updateRestaurant",
    tag = "Product Admin",
    request_body = UpdateRestaurantStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Restaurant),
        (status = 404, description = "Restaurante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_restaurant_status(
    State(app_state): State<AppState>,
    _: RequireRole<ProductAdminOnly>,
    Json(payload): Json<UpdateRestaurantStatusPayload>,
) -> Result<Json<Restaurant>, AppError> {
    let restaurant = app_state
        .restaurant_service
        .set_status(payload.restaurant_id, payload.status)
        .await?;
    Ok(Json(restaurant))
}

// POST /api/v1/productAdmin/restaurants/{id}/admins
#[utoipa::path(
    post,
    path = "/api/v1/productAdmin/restaurants/{id}/admins",
    tag = "Product Admin",
    request_body = CreateRestaurantAdminPayload,
    params(("id" = Uuid, Path, description = "ID do restaurante")),
    responses(
        (status = 201, description = "Acesso ao painel criado", body = RestaurantAdmin),
        (status = 404, description = "Restaurante não encontrado"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_restaurant_admin(
    State(app_state): State<AppState>,
    _: RequireRole<ProductAdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateRestaurantAdminPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let admin = app_state.restaurant_service.add_restaurant_admin(id, payload).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

// DELETE /api/v1/productAdmin/deleteRestaurant/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/productAdmin/deleteRestaurant/{id}",
    tag = "Product Admin",
    params(("id" = Uuid, Path, description = "ID do restaurante")),
    responses(
        (status = 200, description = "Restaurante e dados vinculados removidos", body = DecommissionReport),
        (status = 404, description = "Restaurante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_restaurant(
    State(app_state): State<AppState>,
    _: RequireRole<ProductAdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.restaurant_service.decommission_restaurant(id).await?;
    Ok(Json(json!({
        "message": "Restaurante removido com sucesso.",
        "removed": report,
    })))
}
