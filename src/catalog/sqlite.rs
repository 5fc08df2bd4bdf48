//! SQLite-backed catalog collaborators

use std::collections::BTreeSet;

use super::{CoverageSource, PlanPage, PlanQuery, PlanSource, ProviderSource};
use crate::db::{coverage, plans, providers, CatalogDb};
use crate::error::StoreError;
use crate::models::{CoverageRow, Plan, Provider, Technology, ZipCode};

#[async_trait::async_trait]
impl CoverageSource for CatalogDb {
    async fn active_coverage(
        &self,
        zip: &ZipCode,
        technology: Option<Technology>,
    ) -> Result<Vec<CoverageRow>, StoreError> {
        self.with_conn(|conn| coverage::active_coverage(conn, zip, technology))
    }
}

#[async_trait::async_trait]
impl ProviderSource for CatalogDb {
    async fn providers_by_ids(&self, ids: &BTreeSet<i64>) -> Result<Vec<Provider>, StoreError> {
        self.with_conn(|conn| providers::providers_by_ids(conn, ids))
    }

    async fn provider_by_slug(&self, slug: &str) -> Result<Option<Provider>, StoreError> {
        self.with_conn(|conn| providers::provider_by_slug(conn, slug))
    }
}

#[async_trait::async_trait]
impl PlanSource for CatalogDb {
    async fn plans_for_provider(&self, provider_id: i64) -> Result<Vec<Plan>, StoreError> {
        self.with_conn(|conn| plans::plans_for_provider(conn, provider_id))
    }

    async fn search_plans(&self, query: &PlanQuery) -> Result<PlanPage, StoreError> {
        self.with_conn(|conn| plans::search_plans(conn, query))
    }
}
