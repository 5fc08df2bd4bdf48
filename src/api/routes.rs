//! HTTP handlers

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::extract::ApiQuery;
use super::response::ApiError;
use super::SharedState;
use crate::catalog::{PlanPage, PlanQuery, PlanSort, SortOrder, DEFAULT_PLAN_LIMIT};
use crate::error::ValidationError;
use crate::models::{PlanView, Provider, ProviderWithCoverage};
use crate::resolver::ZipCoverageStats;
use crate::services::{rank_by_technology, PlanSummary};

const PROVIDERS_FAILED: &str = "Failed to fetch providers";
const PLANS_FAILED: &str = "Failed to fetch plans";
const NO_PROVIDERS: &str = "No providers found for this ZIP code";
const MAX_LIST_LIMIT: usize = 50;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    "OK"
}

// === Availability ===

#[derive(Debug, Default, Deserialize)]
pub struct AvailableParams {
    pub zip: Option<String>,
    pub technology: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableResponse {
    pub success: bool,
    pub zip_code: String,
    pub providers: Vec<Provider>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/providers/available
pub async fn available_providers(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<AvailableParams>,
) -> Result<Json<AvailableResponse>, ApiError> {
    let zip = params.zip.as_deref().unwrap_or_default();
    let providers = state
        .resolver
        .resolve(zip, params.technology.as_deref())
        .await
        .map_err(|e| ApiError::from_resolve(e, PROVIDERS_FAILED))?;

    let count = providers.len();
    Ok(Json(AvailableResponse {
        success: true,
        zip_code: zip.to_string(),
        providers,
        count,
        message: (count == 0).then(|| NO_PROVIDERS.to_string()),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub zip: Option<String>,
    pub technology: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub success: bool,
    pub zip_code: String,
    pub providers: Vec<ProviderWithCoverage>,
    /// Providers available before the limit was applied
    pub total: usize,
}

/// GET /api/providers/list - technology-ranked, truncated
pub async fn list_providers(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let zip = params.zip.as_deref().unwrap_or_default();
    let mut providers = state
        .resolver
        .resolve_with_coverage(zip, params.technology.as_deref())
        .await
        .map_err(|e| ApiError::from_resolve(e, PROVIDERS_FAILED))?;

    // Unparseable limits fall back to the default rather than failing
    let limit = params
        .limit
        .as_deref()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .unwrap_or(state.list_default_limit)
        .clamp(1, MAX_LIST_LIMIT);

    rank_by_technology(&mut providers);
    let total = providers.len();
    providers.truncate(limit);

    Ok(Json(ListResponse {
        success: true,
        zip_code: zip.to_string(),
        providers,
        total,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub zip: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    pub zip_code: String,
    pub stats: ZipCoverageStats,
}

/// GET /api/coverage/stats
pub async fn coverage_stats(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<StatsParams>,
) -> Result<Json<StatsResponse>, ApiError> {
    let zip = params.zip.as_deref().unwrap_or_default();
    let stats = state
        .resolver
        .coverage_stats(zip)
        .await
        .map_err(|e| ApiError::from_resolve(e, PROVIDERS_FAILED))?;

    Ok(Json(StatsResponse {
        success: true,
        zip_code: zip.to_string(),
        stats,
    }))
}

// === Providers & plans ===

#[derive(Debug, Serialize)]
pub struct ProviderDetailResponse {
    pub success: bool,
    pub provider: Provider,
    pub summary: PlanSummary,
    pub plans: Vec<PlanView>,
}

/// GET /api/providers/:slug
pub async fn provider_detail(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> Result<Json<ProviderDetailResponse>, ApiError> {
    let provider = state
        .providers
        .provider_by_slug(&slug)
        .await
        .map_err(ApiError::dependency(PROVIDERS_FAILED))?
        .ok_or(ApiError::NotFound("Provider not found"))?;

    let plans = state
        .plans
        .plans_for_provider(provider.id)
        .await
        .map_err(ApiError::dependency(PLANS_FAILED))?;

    debug!(slug = %slug, plans = plans.len(), "Provider detail");

    Ok(Json(ProviderDetailResponse {
        success: true,
        summary: PlanSummary::from_plans(&plans),
        provider,
        plans: plans.into_iter().map(PlanView::from).collect(),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlansParams {
    pub provider_slug: Option<String>,
    pub min_speed: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1)));
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next_page: u64::from(page) < total_pages,
            has_prev_page: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub success: bool,
    pub plans: Vec<PlanView>,
    pub pagination: Pagination,
}

fn parse_param<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::InvalidQuery(format!("{} must be a number", name))),
    }
}

/// GET /api/plans
pub async fn search_plans(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<PlansParams>,
) -> Result<Json<PlansResponse>, ApiError> {
    let mut query = PlanQuery {
        min_download: parse_param("minSpeed", params.min_speed.as_deref())?,
        max_price: parse_param("maxPrice", params.max_price.as_deref())?,
        sort: params.sort_by.as_deref().map(PlanSort::parse).unwrap_or_default(),
        order: params.sort_order.as_deref().map(SortOrder::parse).unwrap_or_default(),
        page: parse_param("page", params.page.as_deref())?.unwrap_or(1),
        limit: parse_param("limit", params.limit.as_deref())?.unwrap_or(DEFAULT_PLAN_LIMIT),
        ..Default::default()
    };
    query.validate()?;

    if let Some(slug) = params.provider_slug.as_deref().filter(|s| !s.is_empty()) {
        let provider = state
            .providers
            .provider_by_slug(slug)
            .await
            .map_err(ApiError::dependency(PLANS_FAILED))?;

        match provider {
            Some(p) => query.provider_id = Some(p.id),
            None => {
                return Ok(Json(PlansResponse {
                    success: true,
                    plans: Vec::new(),
                    pagination: Pagination::new(query.page, query.limit, 0),
                }))
            }
        }
    }

    let PlanPage { plans, total } = state
        .plans
        .search_plans(&query)
        .await
        .map_err(ApiError::dependency(PLANS_FAILED))?;

    Ok(Json(PlansResponse {
        success: true,
        plans: plans.into_iter().map(PlanView::from).collect(),
        pagination: Pagination::new(query.page, query.limit, total),
    }))
}
