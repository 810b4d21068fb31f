// src/router.rs

use anyhow::Context;
use axum::{
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> anyhow::Result<Router> {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/createAdmin", post(handlers::auth::create_admin))
        .route("/validateAdmin", post(handlers::auth::validate_admin))
        .route("/validateRestaurantAdmin", post(handlers::auth::validate_restaurant_admin))
        .route("/external/addRestaurant", post(handlers::auth::add_restaurant_external));

    // O papel é checado em cada handler pelo extrator RequireRole
    let product_admin_routes = Router::new()
        .route("/addRestaurant", post(handlers::product_admin::add_restaurant))
        .route("/getRestaurants", post(handlers::product_admin::get_restaurants))
        .route("/getRestaurant", post(handlers::product_admin::get_restaurant))
        .route("/editRestaurant/{id}", put(handlers::product_admin::edit_restaurant))
        .route("/updateRestaurant", post(handlers::product_admin::update_restaurant_status))
        .route("/restaurants/{id}/admins", post(handlers::product_admin::add_restaurant_admin))
        .route("/deleteRestaurant/{id}", delete(handlers::product_admin::delete_restaurant));

    let restaurant_admin_routes = Router::new()
        .route("/addCustomer", post(handlers::restaurant_admin::add_customer))
        .route("/addReward", post(handlers::restaurant_admin::add_reward))
        .route("/getCustomer/{id}", get(handlers::restaurant_admin::get_customer))
        .route("/editCustomer/{id}", put(handlers::restaurant_admin::edit_customer))
        .route("/deleteCustomer/{id}", delete(handlers::restaurant_admin::delete_customer))
        .route("/customerLogs/{id}", post(handlers::restaurant_admin::customer_logs))
        .route("/rewardPoints", get(handlers::restaurant_admin::restaurant_ledger));

    let common_routes = Router::new()
        .route("/getCustomers", post(handlers::common::get_customers))
        .route("/getRewardPoints", post(handlers::common::get_reward_points));

    // Tudo aqui exige Bearer válido
    let protected_routes = Router::new()
        .nest("/productAdmin", product_admin_routes)
        .nest("/restaurantAdmin", restaurant_admin_routes)
        .nest("/common", common_routes)
        // Atalhos
        .route("/reward", post(handlers::restaurant_admin::add_reward))
        .route("/customer/{id}", get(handlers::restaurant_admin::get_customer))
        .route("/rewardPoints", get(handlers::common::reward_points))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    let cors = cors_layer(app_state.config.cors_allow_origins.as_deref())?;

    // Combina tudo no router principal
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api/v1", api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    Ok(app)
}

/// `CORS_ALLOW_ORIGINS` é uma lista separada por vírgulas; ausente libera qualquer origem.
fn cors_layer(allow_origins: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let Some(raw) = allow_origins.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(layer.allow_origin(Any));
    };

    let origins = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Origem CORS inválida: {}", origin))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}
