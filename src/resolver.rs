//! Coverage resolver - ZIP (+ technology) to deduplicated providers
//!
//! Two sequential reads: active coverage rows for the ZIP, then the
//! provider records they reference. Input is validated before either read,
//! and a failure in either read fails the whole resolution.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{CoverageSource, ProviderSource};
use crate::error::{ResolveError, ValidationError};
use crate::models::{CoverageRow, Provider, ProviderWithCoverage, Technology, ZipCode};

/// Parse the optional technology filter; blank means no filter.
///
/// Anything else must be one of the canonical spellings exactly.
pub fn parse_technology(raw: Option<&str>) -> Result<Option<Technology>, ValidationError> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

#[derive(Clone)]
pub struct CoverageResolver {
    coverage: Arc<dyn CoverageSource>,
    providers: Arc<dyn ProviderSource>,
}

impl CoverageResolver {
    pub fn new(coverage: Arc<dyn CoverageSource>, providers: Arc<dyn ProviderSource>) -> Self {
        Self { coverage, providers }
    }

    /// Both collaborators served by one store
    pub fn from_catalog<C>(catalog: Arc<C>) -> Self
    where
        C: CoverageSource + ProviderSource + 'static,
    {
        Self {
            coverage: catalog.clone(),
            providers: catalog,
        }
    }

    /// Providers with active coverage in `zip`, sorted by name.
    ///
    /// An empty list is a successful answer.
    pub async fn resolve(
        &self,
        zip: &str,
        technology: Option<&str>,
    ) -> Result<Vec<Provider>, ResolveError> {
        let zip = ZipCode::parse(zip)?;
        let technology = parse_technology(technology)?;
        self.resolve_validated(&zip, technology).await
    }

    pub async fn resolve_validated(
        &self,
        zip: &ZipCode,
        technology: Option<Technology>,
    ) -> Result<Vec<Provider>, ResolveError> {
        let rows = self.coverage.active_coverage(zip, technology).await?;
        let ids: BTreeSet<i64> = rows.iter().map(|r| r.provider_id).collect();

        let mut providers = self.fetch_providers(zip, &ids).await?;
        sort_by_name(&mut providers);

        debug!(zip = %zip, technology = ?technology, rows = rows.len(), count = providers.len(), "Resolved providers");
        Ok(providers)
    }

    /// Like [`resolve`](Self::resolve), with per-provider coverage detail
    /// for this ZIP attached
    pub async fn resolve_with_coverage(
        &self,
        zip: &str,
        technology: Option<&str>,
    ) -> Result<Vec<ProviderWithCoverage>, ResolveError> {
        let zip = ZipCode::parse(zip)?;
        let technology = parse_technology(technology)?;

        let rows = self.coverage.active_coverage(&zip, technology).await?;
        let mut by_provider: BTreeMap<i64, Vec<&CoverageRow>> = BTreeMap::new();
        for row in &rows {
            by_provider.entry(row.provider_id).or_default().push(row);
        }

        let ids: BTreeSet<i64> = by_provider.keys().copied().collect();
        let mut providers = self.fetch_providers(&zip, &ids).await?;
        sort_by_name(&mut providers);

        Ok(providers
            .into_iter()
            .map(|provider| {
                let rows = by_provider.get(&provider.id).map(Vec::as_slice).unwrap_or_default();
                attach_coverage(provider, rows)
            })
            .collect())
    }

    /// Provider counts for a ZIP, overall and per technology
    pub async fn coverage_stats(&self, zip: &str) -> Result<ZipCoverageStats, ResolveError> {
        let zip = ZipCode::parse(zip)?;
        let rows = self.coverage.active_coverage(&zip, None).await?;

        let providers: BTreeSet<i64> = rows.iter().map(|r| r.provider_id).collect();
        let mut per_tech: BTreeMap<&str, BTreeSet<i64>> = BTreeMap::new();
        for row in &rows {
            if let Some(tech) = row.technology.as_deref() {
                per_tech.entry(tech).or_default().insert(row.provider_id);
            }
        }

        let mut by_technology: Vec<TechnologyCount> = per_tech
            .into_iter()
            .map(|(technology, ids)| TechnologyCount {
                technology: technology.to_string(),
                providers: ids.len(),
            })
            .collect();
        by_technology.sort_by(|a, b| {
            Technology::priority_of(&b.technology)
                .cmp(&Technology::priority_of(&a.technology))
                .then_with(|| a.technology.cmp(&b.technology))
        });

        Ok(ZipCoverageStats {
            zip_code: zip,
            provider_count: providers.len(),
            by_technology,
        })
    }

    async fn fetch_providers(
        &self,
        zip: &ZipCode,
        ids: &BTreeSet<i64>,
    ) -> Result<Vec<Provider>, ResolveError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let providers = self.providers.providers_by_ids(ids).await?;
        if providers.len() < ids.len() {
            warn!(
                zip = %zip,
                referenced = ids.len(),
                found = providers.len(),
                "Coverage references unknown providers"
            );
        }

        // Guard against a store that returns the same provider twice
        let mut seen = BTreeSet::new();
        Ok(providers.into_iter().filter(|p| seen.insert(p.id)).collect())
    }
}

fn sort_by_name(providers: &mut [Provider]) {
    providers.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.id.cmp(&b.id))
    });
}

fn attach_coverage(provider: Provider, rows: &[&CoverageRow]) -> ProviderWithCoverage {
    let mut covered: Vec<String> = rows
        .iter()
        .filter_map(|r| r.technology.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    covered.sort_by_key(|t| std::cmp::Reverse(Technology::priority_of(t)));

    let best = |f: fn(&CoverageRow) -> Option<f64>| {
        rows.iter().filter_map(|r| f(r)).reduce(f64::max)
    };

    ProviderWithCoverage {
        provider,
        covered_technologies: covered,
        availability_percent: best(|r| r.availability_percent),
        max_speed: best(|r| r.max_speed),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipCoverageStats {
    pub zip_code: ZipCode,
    pub provider_count: usize,
    pub by_technology: Vec<TechnologyCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnologyCount {
    pub technology: String,
    pub providers: usize,
}
