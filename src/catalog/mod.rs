//! Catalog collaborators - read-only access to providers, coverage and plans
//!
//! The resolver and HTTP handlers only see these traits, so the backing
//! store can be swapped (SQLite in production, in-memory in tests).

pub mod memory;
pub mod sqlite;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{StoreError, ValidationError};
use crate::models::{CoverageRow, Plan, Provider, Technology, ZipCode};

pub use memory::InMemoryCatalog;

// =============================================================================
// Traits
// =============================================================================

#[async_trait::async_trait]
pub trait CoverageSource: Send + Sync {
    /// Rows for `zip` with `has_service = true`, restricted to `technology`
    /// when given
    async fn active_coverage(
        &self,
        zip: &ZipCode,
        technology: Option<Technology>,
    ) -> Result<Vec<CoverageRow>, StoreError>;
}

#[async_trait::async_trait]
pub trait ProviderSource: Send + Sync {
    /// Provider records whose id is in `ids`; unknown ids are skipped
    async fn providers_by_ids(&self, ids: &BTreeSet<i64>) -> Result<Vec<Provider>, StoreError>;

    async fn provider_by_slug(&self, slug: &str) -> Result<Option<Provider>, StoreError>;
}

#[async_trait::async_trait]
pub trait PlanSource: Send + Sync {
    async fn plans_for_provider(&self, provider_id: i64) -> Result<Vec<Plan>, StoreError>;

    async fn search_plans(&self, query: &PlanQuery) -> Result<PlanPage, StoreError>;
}

/// Everything the HTTP layer needs from one backing store
pub trait Catalog: CoverageSource + ProviderSource + PlanSource {}

impl<T: CoverageSource + ProviderSource + PlanSource> Catalog for T {}

// =============================================================================
// Plan queries
// =============================================================================

pub const MAX_PLAN_LIMIT: u32 = 100;
pub const DEFAULT_PLAN_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanSort {
    #[default]
    Price,
    DownloadSpeed,
    Name,
}

impl PlanSort {
    /// Unknown sort keys fall back to price
    pub fn parse(raw: &str) -> Self {
        match raw {
            "download_speed" | "downloadSpeed" => PlanSort::DownloadSpeed,
            "name" => PlanSort::Name,
            _ => PlanSort::Price,
        }
    }

    pub(crate) fn column(&self) -> &'static str {
        match self {
            PlanSort::Price => "monthly_price",
            PlanSort::DownloadSpeed => "download_speed",
            PlanSort::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Filters, ordering and pagination for plan search
#[derive(Debug, Clone, PartialEq)]
pub struct PlanQuery {
    pub provider_id: Option<i64>,
    pub min_download: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: PlanSort,
    pub order: SortOrder,
    /// 1-based
    pub page: u32,
    pub limit: u32,
}

impl Default for PlanQuery {
    fn default() -> Self {
        Self {
            provider_id: None,
            min_download: None,
            max_price: None,
            sort: PlanSort::default(),
            order: SortOrder::default(),
            page: 1,
            limit: DEFAULT_PLAN_LIMIT,
        }
    }
}

impl PlanQuery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page == 0 {
            return Err(ValidationError::InvalidQuery("page must be at least 1".into()));
        }
        if self.limit == 0 || self.limit > MAX_PLAN_LIMIT {
            return Err(ValidationError::InvalidQuery(format!(
                "limit must be between 1 and {}",
                MAX_PLAN_LIMIT
            )));
        }
        Ok(())
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub(crate) fn matches(&self, plan: &Plan) -> bool {
        self.provider_id.map_or(true, |id| plan.provider_id == id)
            && self.min_download.map_or(true, |min| plan.download_speed >= min)
            && self.max_price.map_or(true, |max| plan.monthly_price <= max)
    }
}

/// One page of plan search results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanPage {
    pub plans: Vec<Plan>,
    /// Matches across all pages
    pub total: u64,
}
