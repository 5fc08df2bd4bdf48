//! Catalog fixture import
//!
//! Loads a JSON document of providers, coverage rows and plans into the
//! catalog in one transaction. This is the only write path; the HTTP
//! server never calls it.
//!
//! ```json
//! {
//!   "providers": [{ "id": 1, "name": "AT&T Internet", "slug": "att-internet",
//!                   "category": "Internet", "technologies": ["Fiber"] }],
//!   "coverage":  [{ "providerId": 1, "zipCode": "78701", "hasService": true,
//!                   "technology": "Fiber" }],
//!   "plans":     []
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{coverage, plans, providers, CatalogDb};
use crate::error::StoreError;
use crate::models::{CoverageRow, Plan, Provider, ZipCode};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub coverage: Vec<CoverageRow>,
    #[serde(default)]
    pub plans: Vec<Plan>,
}

impl CatalogFixture {
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub providers: usize,
    pub coverage_rows: usize,
    pub plans: usize,
    /// Coverage rows dropped because their ZIP is not five digits
    pub skipped_coverage: usize,
}

impl CatalogDb {
    /// Upsert providers and plans, append coverage rows
    pub fn import(&self, fixture: &CatalogFixture) -> Result<ImportReport, StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut report = ImportReport::default();

            for provider in &fixture.providers {
                providers::upsert_provider(&tx, provider)?;
                report.providers += 1;
            }

            for row in &fixture.coverage {
                if ZipCode::parse(&row.zip_code).is_err() {
                    warn!(zip = %row.zip_code, provider_id = row.provider_id, "Skipping coverage row with malformed ZIP");
                    report.skipped_coverage += 1;
                    continue;
                }
                coverage::insert_coverage(&tx, row)?;
                report.coverage_rows += 1;
            }

            for plan in &fixture.plans {
                plans::upsert_plan(&tx, plan)?;
                report.plans += 1;
            }

            tx.commit()?;

            info!(
                providers = report.providers,
                coverage_rows = report.coverage_rows,
                plans = report.plans,
                skipped = report.skipped_coverage,
                "Catalog import complete"
            );

            Ok(report)
        })
    }
}
