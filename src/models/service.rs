//! Service model

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    pub costo: Option<f64>,
}

impl Service {
    pub const TABLE: &'static str = "servicios";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            nombre: row.get("nombre")?,
            tipo: row.get("tipo")?,
            costo: row.get("costo")?,
        })
    }

    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT id, nombre, tipo, costo FROM servicios ORDER BY id")?;
        let rows = stmt.query_map([], Self::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
