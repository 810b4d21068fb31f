// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::create_admin,
        handlers::auth::validate_admin,
        handlers::auth::validate_restaurant_admin,
        handlers::auth::add_restaurant_external,

        // --- Product Admin ---
        handlers::product_admin::add_restaurant,
        handlers::product_admin::get_restaurants,
        handlers::product_admin::get_restaurant,
        handlers::product_admin::edit_restaurant,
        handlers::product_admin::update_restaurant_status,
        handlers::product_admin::add_restaurant_admin,
        handlers::product_admin::delete_restaurant,

        // --- Restaurant Admin ---
        handlers::restaurant_admin::add_customer,
        handlers::restaurant_admin::add_reward,
        handlers::restaurant_admin::get_customer,
        handlers::restaurant_admin::edit_customer,
        handlers::restaurant_admin::delete_customer,
        handlers::restaurant_admin::customer_logs,
        handlers::restaurant_admin::restaurant_ledger,

        // --- Common ---
        handlers::common::get_customers,
        handlers::common::get_reward_points,
        handlers::common::reward_points,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::ProductAdmin,
            models::auth::RestaurantAdmin,
            models::auth::CreateProductAdminPayload,
            models::auth::CreateRestaurantAdminPayload,
            models::auth::LoginPayload,
            models::auth::ProductAdminAuthResponse,
            models::auth::RestaurantAuthResponse,

            // --- Restaurantes ---
            models::restaurant::RestaurantStatus,
            models::restaurant::PrimaryContactDetails,
            models::restaurant::Restaurant,
            models::restaurant::RestaurantSummary,
            models::restaurant::CreateRestaurantPayload,
            models::restaurant::EditRestaurantPayload,
            models::restaurant::ListRestaurantsPayload,
            models::restaurant::RestaurantIdPayload,
            models::restaurant::UpdateRestaurantStatusPayload,
            services::restaurant_service::DecommissionReport,

            // --- Clientes ---
            models::customer::Gender,
            models::customer::Customer,
            models::customer::CustomerProfile,
            models::customer::CreateCustomerPayload,
            models::customer::CustomerPatch,
            models::customer::ListCustomersPayload,

            // --- Livro-razão e auditoria ---
            models::ledger::PointsType,
            models::ledger::LedgerEntry,
            models::ledger::PointsBalance,
            models::ledger::AddRewardPayload,
            models::ledger::RewardPointsQuery,
            models::audit::AuditAction,
            models::audit::AuditLogEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Cadastro e Login"),
        (name = "Product Admin", description = "Onboarding e Gestão de Restaurantes"),
        (name = "Restaurant Admin", description = "Clientes e Pontos do Restaurante"),
        (name = "Common", description = "Consultas de Clientes e Extratos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
