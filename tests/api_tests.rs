// tests/api_tests.rs

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use axum::extract::FromRequestParts;
use loyalty_backend::{
    build_router,
    common::error::AppError,
    db::MemoryStore,
    middleware::rbac::{ProductAdminOnly, RequireRole, RestaurantAdminOnly},
    models::auth::{Principal, Role},
    services::notification::LogNotifier,
    AppConfig, AppState,
};

const PASSWORD: &str = "segredo1";

fn app() -> Router {
    let state = AppState::from_parts(
        AppConfig::new("segredo-de-teste"),
        Arc::new(MemoryStore::new()),
        Arc::new(LogNotifier),
    );
    build_router(state).unwrap()
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn restaurant_body(email: &str, phone: &str, status: Option<&str>) -> Value {
    json!({
        "restaurantName": "Cantina da Nona",
        "address": "Rua A, 1",
        "llc": "Nona LLC",
        "phoneNumber": phone,
        "email": email,
        "ownerName": "Nona",
        "primaryContactDetails": {
            "name": "Nona",
            "address": "Rua A, 1",
            "email": "contato@example.com"
        },
        "agreementAccepted": true,
        "status": status,
        "password": PASSWORD
    })
}

fn customer_body(restaurant_id: &str, email: &str, phone: &str) -> Value {
    json!({
        "restaurantId": restaurant_id,
        "email": email,
        "firstName": "Maria",
        "lastName": "Silva",
        "gender": "female",
        "dob": "1990-05-20",
        "phoneNumber": phone,
        "address": "Rua B, 2",
        "city": "Curitiba",
        "state": "PR",
        "zipCode": "80000000"
    })
}

async fn product_admin_token(app: &Router) -> String {
    let (status, _) = call(
        app,
        Method::POST,
        "/api/v1/auth/createAdmin",
        None,
        Some(json!({
            "username": "admin",
            "email": "admin@example.com",
            "password": PASSWORD,
            "phone": "5550001111"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/validateAdmin",
        None,
        Some(json!({ "email": "admin@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["productAdmin"]["email"], "admin@example.com");
    assert!(body["productAdmin"].get("passwordHash").is_none());
    body["token"].as_str().unwrap().to_string()
}

/// Cria um restaurante aceito e devolve (id, token do painel)
async fn accepted_restaurant(app: &Router, admin_token: &str, email: &str, phone: &str) -> (String, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/productAdmin/addRestaurant",
        Some(admin_token),
        Some(restaurant_body(email, phone, Some("accepted"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let restaurant_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/validateRestaurantAdmin",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restaurantId"], restaurant_id.as_str());
    (restaurant_id, body["token"].as_str().unwrap().to_string())
}

async fn add_customer(app: &Router, token: &str, restaurant_id: &str, email: &str, phone: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/restaurantAdmin/addCustomer",
        Some(token),
        Some(customer_body(restaurant_id, email, phone)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

fn reward_body(customer_id: &str, restaurant_id: &str, points: i64, kind: &str) -> Value {
    json!({
        "customerId": customer_id,
        "restaurantId": restaurant_id,
        "points": points,
        "type": kind
    })
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, _) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn role_extractor_hands_over_checked_principal() {
    let restaurant_id = Uuid::new_v4();
    let principal = Principal {
        subject_id: Uuid::new_v4(),
        role: Role::RestaurantAdmin,
        restaurant_id: Some(restaurant_id),
    };
    let (mut parts, _) = Request::builder().uri("/").body(()).unwrap().into_parts();
    parts.extensions.insert(principal);

    let RequireRole(seen, _) = RequireRole::<RestaurantAdminOnly>::from_request_parts(&mut parts, &())
        .await
        .unwrap();
    assert_eq!(seen, principal);
    assert_eq!(seen.restaurant_id, Some(restaurant_id));

    let denied = RequireRole::<ProductAdminOnly>::from_request_parts(&mut parts, &()).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn missing_token_and_bad_token_are_distinct() {
    let app = app();
    let uri = format!("/api/v1/rewardPoints?id={}", Uuid::new_v4());

    let (status, body) = call(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Nenhum token encontrado.");

    let (status, _) = call(&app, Method::GET, &uri, Some("nao-e-um-jwt"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn reward_flow_keeps_balance_consistent() {
    let app = app();
    let admin = product_admin_token(&app).await;
    let (restaurant_id, token) = accepted_restaurant(&app, &admin, "nona@example.com", "5551110000").await;
    let customer_id = add_customer(&app, &token, &restaurant_id, "maria@example.com", "5552220000").await;

    for (points, kind) in [(50, "add"), (30, "add"), (80, "redeem")] {
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/restaurantAdmin/addReward",
            Some(&token),
            Some(reward_body(&customer_id, &restaurant_id, points, kind)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["type"], kind);
    }

    // Atalho /reward: resgate acima do saldo
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/reward",
        Some(&token),
        Some(reward_body(&customer_id, &restaurant_id, 1, "redeem")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_BALANCE");
    assert_eq!(body["available"], 0);
    assert_eq!(body["requested"], 1);

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/v1/customer/{}", customer_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalPoints"], 0);
    assert_eq!(body["totalAddedPoints"], 80);
    assert_eq!(body["totalRedeemedPoints"], 80);

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/v1/rewardPoints?id={}&page=1&limit=2", customer_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["totalPages"], 2);
    let points: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["points"].as_i64().unwrap())
        .collect();
    assert_eq!(points, vec![-80, 30]);

    // SignUp + 3 movimentações; o resgate recusado não deixa rastro
    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/restaurantAdmin/customerLogs/{}", customer_id),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["data"][0]["action"], "redeemPoints");
}

#[tokio::test]
async fn zero_points_is_a_validation_error() {
    let app = app();
    let admin = product_admin_token(&app).await;
    let (restaurant_id, token) = accepted_restaurant(&app, &admin, "nona@example.com", "5551110000").await;
    let customer_id = add_customer(&app, &token, &restaurant_id, "maria@example.com", "5552220000").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/restaurantAdmin/addReward",
        Some(&token),
        Some(reward_body(&customer_id, &restaurant_id, 0, "add")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["points"].is_array());
}

#[tokio::test]
async fn pending_restaurant_cannot_log_in() {
    let app = app();

    // Auto-cadastro ignora o status pedido
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/external/addRestaurant",
        None,
        Some(restaurant_body("novo@example.com", "5553330000", Some("accepted"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/auth/validateRestaurantAdmin",
        None,
        Some(json!({ "email": "novo@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Cadastro pendente de aprovação.");
}

#[tokio::test]
async fn restaurant_admin_is_confined_to_own_tenant() {
    let app = app();
    let admin = product_admin_token(&app).await;
    let (restaurant_a, token_a) = accepted_restaurant(&app, &admin, "a@example.com", "5551110001").await;
    let (restaurant_b, token_b) = accepted_restaurant(&app, &admin, "b@example.com", "5551110002").await;
    let customer_b = add_customer(&app, &token_b, &restaurant_b, "cliente@example.com", "5552220001").await;

    // Pontos para cliente de outro restaurante
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/restaurantAdmin/addReward",
        Some(&token_a),
        Some(reward_body(&customer_b, &restaurant_b, 10, "add")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Restaurante certo no corpo, cliente de outro tenant
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/restaurantAdmin/addReward",
        Some(&token_a),
        Some(reward_body(&customer_b, &restaurant_a, 10, "add")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/api/v1/restaurantAdmin/getCustomer/{}", customer_b),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Listagem sem filtro fica restrita ao próprio restaurante
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/common/getCustomers",
        Some(&token_a),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    // Rotas do administrador do produto
    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/productAdmin/getRestaurants",
        Some(&token_a),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn decommission_cascades_over_the_api() {
    let app = app();
    let admin = product_admin_token(&app).await;
    let (restaurant_id, token) = accepted_restaurant(&app, &admin, "nona@example.com", "5551110000").await;
    let customer_id = add_customer(&app, &token, &restaurant_id, "maria@example.com", "5552220000").await;

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/v1/productAdmin/restaurants/{}/admins", restaurant_id),
        Some(&admin),
        Some(json!({ "username": "gerente", "email": "gerente@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/restaurantAdmin/addReward",
        Some(&token),
        Some(reward_body(&customer_id, &restaurant_id, 40, "add")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/productAdmin/getRestaurant",
        Some(&admin),
        Some(json!({ "id": restaurant_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalPoints"], 40);

    let (status, body) = call(
        &app,
        Method::DELETE,
        &format!("/api/v1/productAdmin/deleteRestaurant/{}", restaurant_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"]["admins"], 1);
    assert_eq!(body["removed"]["customers"], 1);
    assert_eq!(body["removed"]["ledgerEntries"], 1);
    assert_eq!(body["removed"]["auditEntries"], 2);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/productAdmin/getRestaurant",
        Some(&admin),
        Some(json!({ "id": restaurant_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/api/v1/productAdmin/deleteRestaurant/{}", restaurant_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/validateRestaurantAdmin",
        None,
        Some(json!({ "email": "gerente@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn restaurant_listing_filters_and_paginates() {
    let app = app();
    let admin = product_admin_token(&app).await;
    accepted_restaurant(&app, &admin, "nona@example.com", "5551110000").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/auth/external/addRestaurant",
        None,
        Some(json!({
            "restaurantName": "Bar do Zé",
            "address": "Rua C, 3",
            "llc": "Ze LLC",
            "phoneNumber": "5554440000",
            "email": "ze@example.com",
            "ownerName": "Zé",
            "primaryContactDetails": { "name": "Zé", "address": "Rua C, 3", "email": "ze@example.com" },
            "agreementAccepted": true,
            "password": PASSWORD
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/productAdmin/getRestaurants",
        Some(&admin),
        Some(json!({ "isAccepted": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["email"], "nona@example.com");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/productAdmin/getRestaurants",
        Some(&admin),
        Some(json!({ "name": "BAR", "page": 1, "limit": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["limit"], 5);
    assert_eq!(body["data"][0]["restaurantName"], "Bar do Zé");

    // Página além do fim: lista vazia, não erro
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/productAdmin/getRestaurants",
        Some(&admin),
        Some(json!({ "page": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert!(body["data"].as_array().unwrap().is_empty());
}
