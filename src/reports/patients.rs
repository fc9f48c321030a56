//! Patient reports

use rusqlite::Connection;
use serde::Serialize;

use super::{query_all, LabeledCount, TOP_PATIENTS};
use crate::db::DbResult;
use crate::models::Patient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearCount {
    pub year: i32,
    pub count: i64,
}

/// Patients no appointment references
pub fn patients_without_appointments(conn: &Connection) -> DbResult<Vec<Patient>> {
    query_all(
        conn,
        "SELECT p.id AS id, p.nombre AS nombre, p.fecha_nacimiento AS fecha_nacimiento
         FROM pacientes p
         LEFT JOIN citas c ON c.paciente_id = p.id
         WHERE c.id IS NULL
         ORDER BY p.nombre ASC, p.id ASC",
        Patient::from_row,
    )
}

/// Patient count per birth year, ascending; unparseable dates are skipped
pub fn birth_year_distribution(conn: &Connection) -> DbResult<Vec<BirthYearCount>> {
    query_all(
        conn,
        "SELECT CAST(strftime('%Y', fecha_nacimiento) AS INTEGER) AS year, COUNT(*) AS total
         FROM pacientes
         WHERE strftime('%Y', fecha_nacimiento) IS NOT NULL
         GROUP BY year
         ORDER BY year ASC",
        |row| {
            Ok(BirthYearCount {
                year: row.get(0)?,
                count: row.get(1)?,
            })
        },
    )
}

/// Top patients by appointment count; ties ordered by name
pub fn top_patients(conn: &Connection) -> DbResult<Vec<LabeledCount>> {
    let sql = format!(
        "SELECT p.nombre, COUNT(*) AS total
         FROM citas c
         JOIN pacientes p ON p.id = c.paciente_id
         GROUP BY p.id
         ORDER BY total DESC, p.nombre ASC
         LIMIT {}",
        TOP_PATIENTS
    );
    query_all(conn, &sql, LabeledCount::from_row)
}
