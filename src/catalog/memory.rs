//! In-memory catalog
//!
//! Backs tests and the `:memory:` demo mode. Counts every collaborator call
//! and can be told to fail, so callers can check short-circuiting and
//! dependency-error handling.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{CoverageSource, PlanPage, PlanQuery, PlanSort, PlanSource, ProviderSource, SortOrder};
use crate::error::StoreError;
use crate::models::{CoverageRow, Plan, Provider, Technology, ZipCode};

#[derive(Default)]
pub struct InMemoryCatalog {
    providers: Vec<Provider>,
    coverage: Vec<CoverageRow>,
    plans: Vec<Plan>,
    coverage_calls: AtomicUsize,
    provider_calls: AtomicUsize,
    plan_calls: AtomicUsize,
    fail_coverage: AtomicBool,
    fail_providers: AtomicBool,
    fail_plans: AtomicBool,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_coverage(mut self, row: CoverageRow) -> Self {
        self.coverage.push(row);
        self
    }

    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plans.push(plan);
        self
    }

    pub fn fail_coverage(&self, fail: bool) {
        self.fail_coverage.store(fail, Ordering::SeqCst);
    }

    pub fn fail_providers(&self, fail: bool) {
        self.fail_providers.store(fail, Ordering::SeqCst);
    }

    pub fn fail_plans(&self, fail: bool) {
        self.fail_plans.store(fail, Ordering::SeqCst);
    }

    pub fn coverage_calls(&self) -> usize {
        self.coverage_calls.load(Ordering::SeqCst)
    }

    pub fn provider_calls(&self) -> usize {
        self.provider_calls.load(Ordering::SeqCst)
    }

    /// Total collaborator calls of any kind
    pub fn calls(&self) -> usize {
        self.coverage_calls() + self.provider_calls() + self.plan_calls.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(format!("{} source offline", what)))
        } else {
            Ok(())
        }
    }
}

fn compare_plans(a: &Plan, b: &Plan, sort: PlanSort) -> CmpOrdering {
    match sort {
        PlanSort::Price => a.monthly_price.total_cmp(&b.monthly_price),
        PlanSort::DownloadSpeed => a.download_speed.total_cmp(&b.download_speed),
        PlanSort::Name => a.name.cmp(&b.name),
    }
}

#[async_trait::async_trait]
impl CoverageSource for InMemoryCatalog {
    async fn active_coverage(
        &self,
        zip: &ZipCode,
        technology: Option<Technology>,
    ) -> Result<Vec<CoverageRow>, StoreError> {
        self.coverage_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_coverage, "coverage")?;

        Ok(self
            .coverage
            .iter()
            .filter(|row| row.has_service && row.zip_code == zip.as_str())
            .filter(|row| match technology {
                Some(t) => row.technology.as_deref() == Some(t.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl ProviderSource for InMemoryCatalog {
    async fn providers_by_ids(&self, ids: &BTreeSet<i64>) -> Result<Vec<Provider>, StoreError> {
        self.provider_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_providers, "provider")?;

        Ok(self
            .providers
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn provider_by_slug(&self, slug: &str) -> Result<Option<Provider>, StoreError> {
        self.provider_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_providers, "provider")?;

        Ok(self.providers.iter().find(|p| p.slug == slug).cloned())
    }
}

#[async_trait::async_trait]
impl PlanSource for InMemoryCatalog {
    async fn plans_for_provider(&self, provider_id: i64) -> Result<Vec<Plan>, StoreError> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_plans, "plan")?;

        let mut plans: Vec<Plan> = self
            .plans
            .iter()
            .filter(|p| p.provider_id == provider_id)
            .cloned()
            .collect();
        plans.sort_by(|a, b| compare_plans(a, b, PlanSort::Price).then(a.id.cmp(&b.id)));
        Ok(plans)
    }

    async fn search_plans(&self, query: &PlanQuery) -> Result<PlanPage, StoreError> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_plans, "plan")?;

        let mut matched: Vec<Plan> = self.plans.iter().filter(|p| query.matches(p)).cloned().collect();
        matched.sort_by(|a, b| {
            let ord = compare_plans(a, b, query.sort);
            let ord = match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            ord.then(a.id.cmp(&b.id))
        });

        let total = matched.len() as u64;
        let plans = matched
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();

        Ok(PlanPage { plans, total })
    }
}
