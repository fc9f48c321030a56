//! Doctor model

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub nombre: Option<String>,
    pub especialidad: Option<String>,
}

impl Doctor {
    pub const TABLE: &'static str = "doctores";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            nombre: row.get("nombre")?,
            especialidad: row.get("especialidad")?,
        })
    }

    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT id, nombre, especialidad FROM doctores ORDER BY id")?;
        let rows = stmt.query_map([], Self::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
