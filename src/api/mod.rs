//! API layer - HTTP interface over the resolver and catalog
//!
//! Provides:
//! - Provider availability by ZIP (plain and technology-ranked)
//! - Coverage statistics per ZIP
//! - Provider detail with plan summary, and plan search

pub mod extract;
pub mod response;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method, StatusCode},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::catalog::{Catalog, PlanSource, ProviderSource};
use crate::config::ApiConfig;
use crate::resolver::CoverageResolver;
use response::error_response;

/// State shared across handlers; read-only after startup
pub struct AppState {
    pub resolver: CoverageResolver,
    pub providers: Arc<dyn ProviderSource>,
    pub plans: Arc<dyn PlanSource>,
    pub list_default_limit: usize,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn from_catalog<C>(catalog: Arc<C>, api: &ApiConfig) -> Self
    where
        C: Catalog + 'static,
    {
        Self {
            resolver: CoverageResolver::from_catalog(catalog.clone()),
            providers: catalog.clone(),
            plans: catalog,
            list_default_limit: api.list_default_limit,
        }
    }
}

/// Create the API router
pub fn create_router(state: SharedState, request_timeout: Duration) -> Router {
    // Read-only public API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/providers/available", get(routes::available_providers))
        .route("/api/providers/list", get(routes::list_providers))
        .route("/api/providers/:slug", get(routes::provider_detail))
        .route("/api/coverage/stats", get(routes::coverage_stats))
        .route("/api/plans", get(routes::search_plans))
        // Health check
        .route("/health", get(routes::health))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::map_response(envelope_timeouts))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `TimeoutLayer` answers with an empty 408; give it the JSON envelope
async fn envelope_timeouts(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        error_response(StatusCode::REQUEST_TIMEOUT, "Request timed out")
    } else {
        response
    }
}
