//! Provider table operations

use std::collections::BTreeSet;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::error::StoreError;
use crate::models::Provider;

const PROVIDER_COLUMNS: &str = "id, name, slug, category, technologies_json";

/// Raw row before the technologies JSON is decoded
struct ProviderRecord {
    id: i64,
    name: String,
    slug: String,
    category: String,
    technologies_json: String,
}

impl ProviderRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            category: row.get(3)?,
            technologies_json: row.get(4)?,
        })
    }

    fn into_provider(self) -> Result<Provider, StoreError> {
        let technologies: Vec<String> = serde_json::from_str(&self.technologies_json)
            .map_err(|e| StoreError::Corrupt(format!("provider {} technologies: {}", self.id, e)))?;

        Ok(Provider {
            id: self.id,
            name: self.name,
            slug: self.slug,
            category: self.category,
            technologies,
        })
    }
}

/// Providers whose id is in `ids`
pub fn providers_by_ids(conn: &Connection, ids: &BTreeSet<i64>) -> Result<Vec<Provider>, StoreError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT {} FROM providers WHERE id IN ({})",
        PROVIDER_COLUMNS, placeholders
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| StoreError::Query(format!("Failed to prepare provider lookup: {}", e)))?;

    let records = stmt
        .query_map(params_from_iter(ids.iter()), ProviderRecord::from_row)
        .map_err(|e| StoreError::Query(format!("Failed to query providers: {}", e)))?
        .collect::<Result<Vec<_>, _>>()?;

    records.into_iter().map(ProviderRecord::into_provider).collect()
}

pub fn provider_by_slug(conn: &Connection, slug: &str) -> Result<Option<Provider>, StoreError> {
    let sql = format!("SELECT {} FROM providers WHERE slug = ?", PROVIDER_COLUMNS);

    let record = conn
        .query_row(&sql, params![slug], ProviderRecord::from_row)
        .optional()
        .map_err(|e| StoreError::Query(format!("Failed to get provider {}: {}", slug, e)))?;

    record.map(ProviderRecord::into_provider).transpose()
}

/// Insert or replace a provider by id
pub fn upsert_provider(conn: &Connection, provider: &Provider) -> Result<(), StoreError> {
    let technologies_json = serde_json::to_string(&provider.technologies)?;

    conn.execute(
        "INSERT INTO providers (id, name, slug, category, technologies_json)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            slug = excluded.slug,
            category = excluded.category,
            technologies_json = excluded.technologies_json",
        params![
            provider.id,
            provider.name,
            provider.slug,
            provider.category,
            technologies_json
        ],
    )
    .map_err(|e| StoreError::Query(format!("Failed to upsert provider {}: {}", provider.slug, e)))?;

    Ok(())
}
