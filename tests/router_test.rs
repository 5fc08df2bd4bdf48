//! Router integration tests
//!
//! Requests go through `create_router`, so route paths, query decoding and
//! the middleware stack are all in play.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use coverage_node::api::{create_router, AppState};
use coverage_node::config::ApiConfig;
use coverage_node::{CoverageRow, InMemoryCatalog, Plan, Provider};

fn provider(id: i64, name: &str, slug: &str, tech: &str) -> Provider {
    Provider {
        id,
        name: name.to_string(),
        slug: slug.to_string(),
        category: "Internet".to_string(),
        technologies: vec![tech.to_string()],
    }
}

fn coverage(provider_id: i64, tech: &str) -> CoverageRow {
    CoverageRow {
        provider_id,
        zip_code: "78701".to_string(),
        has_service: true,
        technology: Some(tech.to_string()),
        availability_percent: None,
        max_speed: None,
    }
}

fn plan(id: i64, provider_id: i64, price: f64, speed: f64, cap: Option<f64>) -> Plan {
    Plan {
        id,
        provider_id,
        name: format!("Plan {}", id),
        download_speed: speed,
        upload_speed: None,
        monthly_price: price,
        promo_text: None,
        contract_months: None,
        data_cap_gb: cap,
    }
}

fn app() -> Router {
    let catalog = Arc::new(
        InMemoryCatalog::new()
            .with_provider(provider(1, "AT&T Internet", "att-internet", "Fiber"))
            .with_provider(provider(2, "Spectrum", "spectrum", "Cable"))
            .with_provider(provider(3, "Viasat", "viasat", "Satellite"))
            .with_coverage(coverage(1, "Fiber"))
            .with_coverage(coverage(2, "Cable"))
            .with_coverage(coverage(3, "Satellite"))
            .with_plan(plan(10, 1, 55.0, 300.0, None))
            .with_plan(plan(11, 1, 80.0, 1000.0, None))
            .with_plan(plan(20, 2, 50.0, 500.0, Some(1200.0))),
    );
    let state = Arc::new(AppState::from_catalog(catalog, &ApiConfig::default()));
    create_router(state, Duration::from_secs(5))
}

async fn get(uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, bytes.to_vec())
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let (status, content_type, bytes) = get(uri).await;
    assert_eq!(content_type.as_deref(), Some("application/json"), "{}", uri);
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

// =============================================================================
// Routes
// =============================================================================

#[tokio::test]
async fn test_health_route() {
    let (status, _, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_available_route() {
    let (status, body) = get_json("/api/providers/available?zip=78701&technology=Fiber").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["providers"][0]["slug"], "att-internet");

    let (status, body) = get_json("/api/providers/available?zip=78701&technology=Fixed%20Wireless").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["message"], "No providers found for this ZIP code");
}

#[tokio::test]
async fn test_available_validation_errors() {
    let (status, body) = get_json("/api/providers/available?zip=ABCDE").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Valid 5-digit ZIP code required");

    let (status, body) = get_json("/api/providers/available?zip=78701&technology=fiber").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported technology: fiber");
}

#[tokio::test]
async fn test_undecodable_query_uses_envelope() {
    let (status, body) = get_json("/api/providers/available?zip=78701&zip=99999").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("zip"), "{}", body);
}

#[tokio::test]
async fn test_list_and_stats_routes() {
    let (status, body) = get_json("/api/providers/list?zip=78701&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["providers"][0]["slug"], "att-internet");
    assert_eq!(body["providers"][1]["slug"], "spectrum");

    let (status, body) = get_json("/api/coverage/stats?zip=78701").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["providerCount"], 3);
}

#[tokio::test]
async fn test_static_routes_win_over_slug() {
    // `available` and `list` must not be taken as provider slugs
    let (status, body) = get_json("/api/providers/list?zip=78701").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("provider").is_none());

    let (status, body) = get_json("/api/providers/att-internet").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"]["name"], "AT&T Internet");
    assert_eq!(body["summary"]["totalPlans"], 2);

    let (status, body) = get_json("/api/providers/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Provider not found");
}

#[tokio::test]
async fn test_plans_route_camel_case_params() {
    let (status, body) =
        get_json("/api/plans?providerSlug=att-internet&minSpeed=500&sortBy=price&sortOrder=desc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plans"].as_array().unwrap().len(), 1);
    assert_eq!(body["plans"][0]["id"], 11);
    assert_eq!(body["plans"][0]["isUnlimited"], true);

    let (_, body) = get_json("/api/plans?maxPrice=60&page=1&limit=10").await;
    let ids: Vec<i64> = body["plans"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![20, 10]);
    assert_eq!(body["plans"][0]["isUnlimited"], false);
    assert_eq!(body["pagination"]["totalPages"], 1);

    let (status, body) = get_json("/api/plans?minSpeed=fast").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid query: minSpeed must be a number");
}

// =============================================================================
// Layers
// =============================================================================

#[tokio::test]
async fn test_cors_header_on_responses() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "https://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (status, _, _) = get("/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
