//! Patient model

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub nombre: Option<String>,
    /// ISO date, may be missing in imported data
    pub fecha_nacimiento: Option<String>,
}

impl Patient {
    pub const TABLE: &'static str = "pacientes";

    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            nombre: row.get("nombre")?,
            fecha_nacimiento: row.get("fecha_nacimiento")?,
        })
    }

    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT id, nombre, fecha_nacimiento FROM pacientes ORDER BY id")?;
        let rows = stmt.query_map([], Self::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
