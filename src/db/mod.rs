//! SQLite catalog store
//!
//! Holds the three catalog tables the request path reads. Rows are only
//! written by the out-of-band importer (see [`import`]).
//!
//! ## Tables
//!
//! - `providers` - id, name, slug, category, technologies JSON
//! - `coverage` - (provider, zip) availability facts; duplicates allowed
//! - `plans` - provider offerings

pub mod coverage;
pub mod import;
pub mod plans;
pub mod providers;
pub mod schema;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::StoreError;

pub use import::{CatalogFixture, ImportReport};

/// Path value that selects an in-memory database
pub const IN_MEMORY: &str = ":memory:";

/// SQLite database for the provider catalog
pub struct CatalogDb {
    conn: Mutex<Connection>,
}

impl CatalogDb {
    /// Open or create the catalog database at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if path.as_os_str() == IN_MEMORY {
            return Self::open_in_memory();
        }

        info!("Opening SQLite catalog at {:?}", path);

        let conn = Connection::open(path)
            .map_err(|e| StoreError::Internal(format!("Failed to open SQLite: {}", e)))?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| StoreError::Internal(format!("Failed to set PRAGMA: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        debug!("Opening in-memory SQLite catalog");

        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Internal(format!("Failed to open in-memory SQLite: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;

        Ok(db)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.with_conn(schema::init_schema)
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Execute a write operation with exclusive access
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&mut conn)
    }

    pub fn stats(&self) -> Result<CatalogStats, StoreError> {
        self.with_conn(|conn| {
            let count = |sql: &str| -> Result<u64, StoreError> {
                let n: i64 = conn
                    .query_row(sql, [], |row| row.get(0))
                    .map_err(|e| StoreError::Query(format!("{}: {}", sql, e)))?;
                Ok(n as u64)
            };

            Ok(CatalogStats {
                providers: count("SELECT COUNT(*) FROM providers")?,
                coverage_rows: count("SELECT COUNT(*) FROM coverage")?,
                active_coverage_rows: count("SELECT COUNT(*) FROM coverage WHERE has_service = 1")?,
                zip_codes: count("SELECT COUNT(DISTINCT zip_code) FROM coverage")?,
                plans: count("SELECT COUNT(*) FROM plans")?,
            })
        })
    }
}

/// Row counts across the catalog tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub providers: u64,
    pub coverage_rows: u64,
    pub active_coverage_rows: u64,
    pub zip_codes: u64,
    pub plans: u64,
}
