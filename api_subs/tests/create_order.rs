use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, http::StatusCode, test, web};
use api_subs::{
    dtos::pay::{CreateOrderRequest, GatewayOrderRequest},
    services::{gateway::RazorpayClient, pay::create_order},
};
use chrono::{Duration, Utc};
use common::{
    env_config::{Config, GatewayCredentials},
    error::AppError,
    jwt::{AuthUser, JwtClaims, generate_jwt},
};
use uuid::Uuid;

async fn fake_orders(req: HttpRequest, body: web::Json<GatewayOrderRequest>) -> HttpResponse {
    let authorized = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if !authorized {
        return HttpResponse::Unauthorized().finish();
    }
    if body.receipt == "reject_me" {
        return HttpResponse::BadRequest()
            .json(serde_json::json!({ "error": { "description": "bad receipt" } }));
    }
    HttpResponse::Ok().json(serde_json::json!({
        "id": "order_Fake123",
        "entity": "order",
        "amount": body.amount,
        "currency": body.currency,
        "receipt": body.receipt,
        "notes": body.notes,
    }))
}

/// Starts a stand-in for the gateway on an ephemeral port and returns its base url.
fn start_fake_gateway() -> String {
    let server = HttpServer::new(|| App::new().route("/orders", web::post().to(fake_orders)))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

fn credentials() -> GatewayCredentials {
    GatewayCredentials {
        key_id: "rzp_test_key".to_string(),
        key_secret: "rzp_test_secret".to_string(),
    }
}

fn user() -> AuthUser {
    AuthUser {
        id: Uuid::new_v4(),
        email: None,
    }
}

#[actix_web::test]
async fn order_is_created_in_minor_units() {
    let base_url = start_fake_gateway();
    let client = RazorpayClient::new(reqwest::Client::new(), &base_url, credentials());

    let req = CreateOrderRequest {
        amount: Some(999),
        ..Default::default()
    };
    let order = create_order(&client, &user(), req, Utc::now()).await.unwrap();

    assert_eq!(order.order_id, "order_Fake123");
    assert_eq!(order.amount, 99_900);
    assert_eq!(order.currency, "INR");
    assert_eq!(order.key_id, "rzp_test_key");
}

#[actix_web::test]
async fn gateway_rejection_is_a_generic_upstream_error() {
    let base_url = start_fake_gateway();
    let client = RazorpayClient::new(reqwest::Client::new(), &base_url, credentials());

    let req = CreateOrderRequest {
        amount: Some(999),
        receipt: Some("reject_me".to_string()),
        ..Default::default()
    };
    let err = create_order(&client, &user(), req, Utc::now()).await.unwrap_err();

    match err {
        AppError::Upstream(msg) => assert_eq!(msg, "Failed to create order"),
        other => panic!("unexpected error: {other:?}"),
    }
}

fn config_without_gateway(gateway_url: &str) -> Config {
    let gateway_url = gateway_url.to_string();
    Config::from_lookup(move |key| match key {
        "ENVIRONMENT" => Some("development".to_string()),
        "DATABASE_URL" => Some("postgres://localhost/tender".to_string()),
        "JWT_SECRET" => Some("pay-route-secret".to_string()),
        "RAZORPAY_API_URL" => Some(gateway_url.clone()),
        _ => None,
    })
    .unwrap()
}

async fn counting_orders(hits: web::Data<Arc<AtomicUsize>>) -> HttpResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Ok().finish()
}

#[actix_web::test]
async fn unconfigured_gateway_fails_before_any_outbound_call() {
    let hits = Arc::new(AtomicUsize::new(0));
    let server_hits = Arc::clone(&hits);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&server_hits)))
            .route("/orders", web::post().to(counting_orders))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let gateway_url = format!("http://{}", server.addrs()[0]);
    actix_web::rt::spawn(server.run());

    let config = Arc::new(config_without_gateway(&gateway_url));
    let jwt_config = config.jwt_config.clone();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(config))
            .app_data(web::Data::new(reqwest::Client::new()))
            .wrap(extractor::middleware(jwt_config.clone()))
            .service(web::scope("/api/dashboard").service(api_subs::mount_pay())),
    )
    .await;

    let claims = JwtClaims {
        sub: Uuid::new_v4(),
        aud: "authenticated".to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        email: None,
        role: None,
    };
    let token = generate_jwt(&claims, &jwt_config).unwrap();
    let req = test::TestRequest::post()
        .uri("/api/dashboard/pay/create-order")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(serde_json::json!({ "amount": 999 }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = test::read_body_json(res).await;
    assert!(!body["error"].as_str().unwrap().contains("RAZORPAY"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
