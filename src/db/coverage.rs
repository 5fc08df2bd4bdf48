//! Coverage table operations

use rusqlite::{params, Connection, Row};

use crate::error::StoreError;
use crate::models::{CoverageRow, Technology, ZipCode};

fn coverage_from_row(row: &Row<'_>) -> rusqlite::Result<CoverageRow> {
    Ok(CoverageRow {
        provider_id: row.get(0)?,
        zip_code: row.get(1)?,
        has_service: row.get(2)?,
        technology: row.get(3)?,
        availability_percent: row.get(4)?,
        max_speed: row.get(5)?,
    })
}

/// Active rows for a ZIP, optionally restricted to one technology.
///
/// A NULL technology never matches a technology filter.
pub fn active_coverage(
    conn: &Connection,
    zip: &ZipCode,
    technology: Option<Technology>,
) -> Result<Vec<CoverageRow>, StoreError> {
    let mut sql = String::from(
        "SELECT provider_id, zip_code, has_service, technology, availability_percent, max_speed
         FROM coverage WHERE zip_code = ? AND has_service = 1",
    );
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(zip.as_str().to_string())];

    if let Some(tech) = technology {
        sql.push_str(" AND technology = ?");
        params_vec.push(Box::new(tech.as_str()));
    }
    sql.push_str(" ORDER BY id");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| StoreError::Query(format!("Failed to prepare coverage lookup: {}", e)))?;

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(params_refs.as_slice(), coverage_from_row)
        .map_err(|e| StoreError::Query(format!("Failed to query coverage for {}: {}", zip, e)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

pub fn insert_coverage(conn: &Connection, row: &CoverageRow) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO coverage (provider_id, zip_code, has_service, technology, availability_percent, max_speed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            row.provider_id,
            row.zip_code,
            row.has_service,
            row.technology,
            row.availability_percent,
            row.max_speed
        ],
    )
    .map_err(|e| {
        StoreError::Query(format!(
            "Failed to insert coverage for provider {} in {}: {}",
            row.provider_id, row.zip_code, e
        ))
    })?;

    Ok(())
}
