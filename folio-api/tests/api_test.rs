use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use folio_api::middleware::AdminClaims;
use folio_api::{app, AppState, AuthConfig};
use folio_pricing::{AdminService, PricingService};
use folio_rules::{PricingPipeline, PricingSignals};
use folio_store::InMemoryStore;

const SECRET: &str = "test-secret";

fn test_app() -> Router {
    let store = Arc::new(InMemoryStore::seeded().unwrap());
    let pricing = PricingService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        PricingPipeline::new(PricingSignals::default(), "USD"),
    );
    let admin = AdminService::new(store.clone(), store.clone(), store);

    app(AppState {
        pricing: Arc::new(pricing),
        admin: Arc::new(admin),
        supplier_feed: None,
        auth: AuthConfig { secret: SECRET.to_string() },
    })
}

fn token(role: &str) -> String {
    token_expiring(role, Utc::now() + Duration::hours(1))
}

fn token_expiring(role: &str, at: chrono::DateTime<Utc>) -> String {
    let claims = AdminClaims { sub: "ops@folio.test".to_string(), role: role.to_string(), exp: at.timestamp() as usize };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(test_app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_calculate_price() {
    let req = json_request(
        "POST",
        "/v1/pricing/calculate",
        json!({ "product_type": "PHOTO_BOOK", "quantity": 1, "timestamp": "2026-03-10T12:00:00Z" }),
        None,
    );
    let (status, body) = send(test_app(), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["base_price"], 22.0);
    assert_eq!(body["breakdown"]["grand_total"], 22.0);
    assert_eq!(body["currency"], "USD");
}

#[tokio::test]
async fn test_zero_quantity_is_bad_request() {
    let req = json_request("POST", "/v1/pricing/calculate", json!({ "product_type": "MUG", "quantity": 0 }), None);
    let (status, body) = send(test_app(), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Quantity"));
}

#[tokio::test]
async fn test_customized_price() {
    let req = json_request(
        "POST",
        "/v1/pricing/customized",
        json!({
            "product_type": "PHOTO_BOOK",
            "variant": null,
            "base_price": 22.0,
            "customizations": [{ "customization_type": "EXTRA_PAGES", "quantity": 5 }]
        }),
        None,
    );
    let (status, body) = send(test_app(), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_price"], 27.0);
    assert_eq!(body["customization_cost"], 5.0);
}

#[tokio::test]
async fn test_unknown_supplier_product_quote_is_not_found() {
    let uri = format!("/v1/pricing/supplier-products/{}/quote?quantity=2", uuid::Uuid::new_v4());
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, _) = send(test_app(), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_compare_suppliers() {
    let req = Request::builder()
        .uri("/v1/pricing/suppliers/compare?product_type=PHOTO_BOOK&variant=A4_HARDCOVER&quantity=1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(test_app(), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cost_quote() {
    let req = json_request(
        "POST",
        "/v1/pricing/cost-quote",
        json!({ "product_type": "MUG", "variant": null, "quantity": 2, "markup": { "mode": "AMOUNT", "value": 5.0 } }),
        None,
    );
    let (status, body) = send(test_app(), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 2);
    assert_eq!(body["unit"]["markup"], 5.0);
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let req = Request::builder().uri("/v1/admin/pricing-rules").body(Body::empty()).unwrap();
    let (status, _) = send(test_app(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let customer = token("CUSTOMER");
    let req = Request::builder()
        .uri("/v1/admin/pricing-rules")
        .header(header::AUTHORIZATION, format!("Bearer {}", customer))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(test_app(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_admin_token_is_rejected() {
    let expired = token_expiring("ADMIN", Utc::now() - Duration::hours(1));
    let req = Request::builder()
        .uri("/v1/admin/pricing-rules")
        .header(header::AUTHORIZATION, format!("Bearer {}", expired))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(test_app(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_rule_lifecycle() {
    let app = test_app();
    let admin = token("ADMIN");

    let create = json_request(
        "POST",
        "/v1/admin/pricing-rules",
        json!({
            "name": "Poster base price",
            "description": null,
            "rule_type": "FIXED",
            "scope": "PRODUCT",
            "priority": 100,
            "valid_from": null,
            "valid_until": null,
            "conditions": { "product_types": ["POSTER"] },
            "pricing": { "base_price": 14.0 },
            "discount": null,
            "dynamic": null,
            "ab_testing": null
        }),
        Some(&admin),
    );
    let (status, created) = send(app.clone(), create).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let price = json_request("POST", "/v1/pricing/calculate", json!({ "product_type": "POSTER", "quantity": 1 }), None);
    let (_, priced) = send(app.clone(), price).await;
    assert_eq!(priced["base_price"], 14.0);

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/admin/pricing-rules/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app.clone(), delete).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let get = Request::builder()
        .uri(format!("/v1/admin/pricing-rules/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", admin))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, get).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_without_feed_is_unavailable() {
    let req = json_request("POST", "/v1/admin/supplier-products/sync", json!({}), Some(&token("SUPER_ADMIN")));
    let (status, _) = send(test_app(), req).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
