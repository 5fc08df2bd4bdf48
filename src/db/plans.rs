//! Plan table operations

use rusqlite::{params, Connection, Row};

use crate::catalog::{PlanPage, PlanQuery, SortOrder};
use crate::error::StoreError;
use crate::models::Plan;

const PLAN_COLUMNS: &str = "id, provider_id, name, download_speed, upload_speed, monthly_price,
    promo_text, contract_months, data_cap_gb";

fn plan_from_row(row: &Row<'_>) -> rusqlite::Result<Plan> {
    Ok(Plan {
        id: row.get(0)?,
        provider_id: row.get(1)?,
        name: row.get(2)?,
        download_speed: row.get(3)?,
        upload_speed: row.get(4)?,
        monthly_price: row.get(5)?,
        promo_text: row.get(6)?,
        contract_months: row.get(7)?,
        data_cap_gb: row.get(8)?,
    })
}

/// All plans of one provider, cheapest first
pub fn plans_for_provider(conn: &Connection, provider_id: i64) -> Result<Vec<Plan>, StoreError> {
    let sql = format!(
        "SELECT {} FROM plans WHERE provider_id = ? ORDER BY monthly_price ASC, id ASC",
        PLAN_COLUMNS
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| StoreError::Query(format!("Failed to prepare plan lookup: {}", e)))?;

    let plans = stmt
        .query_map(params![provider_id], plan_from_row)
        .map_err(|e| StoreError::Query(format!("Failed to query plans: {}", e)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(plans)
}

/// Filtered, sorted, paginated plan search
pub fn search_plans(conn: &Connection, query: &PlanQuery) -> Result<PlanPage, StoreError> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(provider_id) = query.provider_id {
        where_sql.push_str(" AND provider_id = ?");
        params_vec.push(Box::new(provider_id));
    }
    if let Some(min) = query.min_download {
        where_sql.push_str(" AND download_speed >= ?");
        params_vec.push(Box::new(min));
    }
    if let Some(max) = query.max_price {
        where_sql.push_str(" AND monthly_price <= ?");
        params_vec.push(Box::new(max));
    }

    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

    let total: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM plans{}", where_sql),
            params_refs.as_slice(),
            |row| row.get(0),
        )
        .map_err(|e| StoreError::Query(format!("Failed to count plans: {}", e)))?;

    // Sort column comes from a closed enum, never from the request string
    let direction = match query.order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    let sql = format!(
        "SELECT {} FROM plans{} ORDER BY {} {}, id ASC LIMIT {} OFFSET {}",
        PLAN_COLUMNS,
        where_sql,
        query.sort.column(),
        direction,
        query.limit,
        query.offset()
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| StoreError::Query(format!("Failed to prepare plan search: {}", e)))?;

    let plans = stmt
        .query_map(params_refs.as_slice(), plan_from_row)
        .map_err(|e| StoreError::Query(format!("Failed to search plans: {}", e)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PlanPage {
        plans,
        total: total as u64,
    })
}

/// Insert or replace a plan by id
pub fn upsert_plan(conn: &Connection, plan: &Plan) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO plans (id, provider_id, name, download_speed, upload_speed, monthly_price,
                            promo_text, contract_months, data_cap_gb)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(id) DO UPDATE SET
            provider_id = excluded.provider_id,
            name = excluded.name,
            download_speed = excluded.download_speed,
            upload_speed = excluded.upload_speed,
            monthly_price = excluded.monthly_price,
            promo_text = excluded.promo_text,
            contract_months = excluded.contract_months,
            data_cap_gb = excluded.data_cap_gb",
        params![
            plan.id,
            plan.provider_id,
            plan.name,
            plan.download_speed,
            plan.upload_speed,
            plan.monthly_price,
            plan.promo_text,
            plan.contract_months,
            plan.data_cap_gb
        ],
    )
    .map_err(|e| StoreError::Query(format!("Failed to upsert plan {}: {}", plan.id, e)))?;

    Ok(())
}
