//! Database schema definitions

use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating catalog schema v{}", SCHEMA_VERSION);
        conn.execute_batch(CATALOG_SCHEMA)
            .map_err(|e| StoreError::Internal(format!("Failed to create catalog tables: {}", e)))?;
        conn.execute_batch(INDEXES_SCHEMA)
            .map_err(|e| StoreError::Internal(format!("Failed to create indexes: {}", e)))?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(StoreError::Internal(format!(
            "Catalog schema v{} is newer than supported v{}",
            current_version, SCHEMA_VERSION
        )));
    } else {
        info!("Catalog schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32, StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )
    .map_err(|e| StoreError::Internal(format!("Failed to create schema_version table: {}", e)))?;

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StoreError> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| StoreError::Internal(format!("Failed to clear schema_version: {}", e)))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])
        .map_err(|e| StoreError::Internal(format!("Failed to set schema_version: {}", e)))?;
    Ok(())
}

const CATALOG_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS providers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    category TEXT NOT NULL DEFAULT '',
    technologies_json TEXT NOT NULL DEFAULT '[]'
);

-- No uniqueness on (provider_id, zip_code): one row per technology is common
-- and duplicate imports are tolerated.
CREATE TABLE IF NOT EXISTS coverage (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    provider_id INTEGER NOT NULL,
    zip_code TEXT NOT NULL,
    has_service INTEGER NOT NULL DEFAULT 0,
    technology TEXT,
    availability_percent REAL,
    max_speed REAL
);

CREATE TABLE IF NOT EXISTS plans (
    id INTEGER PRIMARY KEY,
    provider_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    download_speed REAL NOT NULL,
    upload_speed REAL,
    monthly_price REAL NOT NULL,
    promo_text TEXT,
    contract_months INTEGER,
    data_cap_gb REAL
);
"#;

const INDEXES_SCHEMA: &str = r#"
CREATE INDEX IF NOT EXISTS idx_coverage_zip ON coverage(zip_code, has_service);
CREATE INDEX IF NOT EXISTS idx_coverage_provider ON coverage(provider_id);
CREATE INDEX IF NOT EXISTS idx_plans_provider ON plans(provider_id);
"#;
