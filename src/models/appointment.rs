//! Appointment model
//!
//! One row of `citas`.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub fecha: Option<String>,
    pub hora: Option<String>,
    pub estado: Option<String>,
    pub doctor_id: Option<i64>,
    pub paciente_id: Option<i64>,
}

impl Appointment {
    pub const TABLE: &'static str = "citas";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            fecha: row.get("fecha")?,
            hora: row.get("hora")?,
            estado: row.get("estado")?,
            doctor_id: row.get("doctor_id")?,
            paciente_id: row.get("paciente_id")?,
        })
    }

    /// Every appointment, oldest first
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, fecha, hora, estado, doctor_id, paciente_id
             FROM citas ORDER BY fecha, hora, id",
        )?;
        let rows = stmt.query_map([], Self::from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::fixtures;

    #[test]
    fn test_list_all_orders_by_date_then_time() {
        let conn = fixtures::empty_db();
        let d = fixtures::add_doctor(&conn, "Dr. A", "General");
        let p = fixtures::add_patient(&conn, "Ana", "1990-01-01");
        fixtures::add_appointment(&conn, "2024-02-01", "09:00", "Pendiente", d, p);
        fixtures::add_appointment(&conn, "2024-01-01", "11:00", "Completada", d, p);
        fixtures::add_appointment(&conn, "2024-01-01", "08:00", "Completada", d, p);

        let all = Appointment::list_all(&conn).unwrap();
        let order: Vec<(&str, &str)> = all
            .iter()
            .map(|a| (a.fecha.as_deref().unwrap_or(""), a.hora.as_deref().unwrap_or("")))
            .collect();
        assert_eq!(
            order,
            vec![("2024-01-01", "08:00"), ("2024-01-01", "11:00"), ("2024-02-01", "09:00")]
        );
        assert_eq!(all[0].doctor_id, Some(d));
    }
}
