//! Service reports

use rusqlite::Connection;
use serde::Serialize;

use super::{query_all, LabeledCount, TOP_SERVICES};
use crate::db::DbResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCost {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    pub costo: f64,
}

/// Service count per type
pub fn service_type_counts(conn: &Connection) -> DbResult<Vec<LabeledCount>> {
    query_all(
        conn,
        "SELECT tipo, COUNT(*) AS total FROM servicios
         GROUP BY tipo ORDER BY total DESC, tipo ASC",
        LabeledCount::from_row,
    )
}

/// Most expensive services; ties ordered by name, unpriced rows skipped
pub fn top_services_by_cost(conn: &Connection) -> DbResult<Vec<ServiceCost>> {
    let sql = format!(
        "SELECT nombre, tipo, costo FROM servicios
         WHERE costo IS NOT NULL
         ORDER BY costo DESC, nombre ASC
         LIMIT {}",
        TOP_SERVICES
    );
    query_all(conn, &sql, |row| {
        Ok(ServiceCost {
            nombre: row.get(0)?,
            tipo: row.get(1)?,
            costo: row.get(2)?,
        })
    })
}
