//! HTTP surface: routing, bearer auth and error mapping.

mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test};
use common::*;
use rewards_backend::handlers::api_config;
use rewards_backend::middlewares::AuthMiddleware;
use rewards_backend::utils::JwtService;
use serde_json::{Value, json};

macro_rules! init_app {
    ($services:expr) => {{
        let services = $services.clone();
        test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(JwtService::new(JWT_SECRET)))
                .configure(move |cfg| services.configure_data(cfg))
                .configure(api_config),
        )
        .await
    }};
}

fn bearer(user_id: i64) -> (&'static str, String) {
    let token = JwtService::new(JWT_SECRET).issue(user_id, 3600).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn prize_list_is_public() {
    let (_db, services) = app_services().await;
    let app = init_app!(services);

    let req = test::TestRequest::get().uri("/api/v1/spin/prizes").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(!body["data"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn protected_routes_need_a_token() {
    let (_db, services) = app_services().await;
    let app = init_app!(services);

    let req = test::TestRequest::post().uri("/api/v1/spin").to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/wallet")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let err = test::try_call_service(&app, req).await.unwrap_err();
    assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn second_spin_returns_cooldown() {
    let (db, services) = app_services().await;
    let user_id = seed_user(&db, "http@example.com").await;
    let app = init_app!(services);

    let req = test::TestRequest::post()
        .uri("/api/v1/spin")
        .insert_header(bearer(user_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert!(body["prize"]["label"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/v1/spin")
        .insert_header(bearer(user_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn discount_preview_picks_family_feast_on_large_baskets() {
    let (db, services) = app_services().await;
    let user_id = seed_user(&db, "deals@example.com").await;
    let app = init_app!(services);

    let req = test::TestRequest::post()
        .uri("/api/v1/discounts/preview")
        .insert_header(bearer(user_id))
        .set_json(json!({
            "subtotal": 50_000,
            "items": [{ "product_name": "Frozen Turkey", "line_total": 50_000 }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["discount"], 7_500);

    let req = test::TestRequest::post()
        .uri("/api/v1/discounts/preview")
        .insert_header(bearer(user_id))
        .set_json(json!({ "subtotal": -1, "items": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
