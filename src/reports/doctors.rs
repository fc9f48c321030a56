//! Doctor reports

use rusqlite::Connection;
use serde::Serialize;

use super::{query_all, LabeledCount};
use crate::db::DbResult;

/// A doctor with its appointment total (zero included)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorTotal {
    pub doctor_id: i64,
    pub nombre: Option<String>,
    pub especialidad: Option<String>,
    pub total: i64,
}

/// Doctor count per specialty
pub fn specialty_counts(conn: &Connection) -> DbResult<Vec<LabeledCount>> {
    query_all(
        conn,
        "SELECT especialidad, COUNT(*) AS total FROM doctores
         GROUP BY especialidad ORDER BY total DESC, especialidad ASC",
        LabeledCount::from_row,
    )
}

/// Appointment totals for every doctor, including doctors without any
pub fn appointments_per_doctor(conn: &Connection) -> DbResult<Vec<DoctorTotal>> {
    query_all(
        conn,
        "SELECT d.id, d.nombre, d.especialidad, COUNT(c.id) AS total
         FROM doctores d
         LEFT JOIN citas c ON c.doctor_id = d.id
         GROUP BY d.id
         ORDER BY total DESC, d.nombre ASC",
        |row| {
            Ok(DoctorTotal {
                doctor_id: row.get(0)?,
                nombre: row.get(1)?,
                especialidad: row.get(2)?,
                total: row.get(3)?,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::fixtures;
    use crate::models::Doctor;
    use crate::reports::MISSING_LABEL;

    #[test]
    fn test_doctor_without_appointments_has_zero() {
        let conn = fixtures::empty_db();
        let busy = fixtures::add_doctor(&conn, "Dr. Busy", "Cardiología");
        let idle = fixtures::add_doctor(&conn, "Dr. Idle", "Pediatría");
        let p = fixtures::add_patient(&conn, "Ana", "1990-01-01");
        fixtures::add_appointment(&conn, "2024-01-01", "09:00", "Completada", busy, p);
        fixtures::add_appointment(&conn, "2024-01-02", "09:00", "Completada", busy, p);

        let totals = appointments_per_doctor(&conn).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!((totals[0].doctor_id, totals[0].total), (busy, 2));
        assert_eq!((totals[1].doctor_id, totals[1].total), (idle, 0));
        assert_eq!(totals[1].especialidad.as_deref(), Some("Pediatría"));
    }

    #[test]
    fn test_per_doctor_totals_with_empty_appointments() {
        let conn = fixtures::empty_db();
        fixtures::add_doctor(&conn, "Dr. B", "General");
        fixtures::add_doctor(&conn, "Dr. A", "General");

        let totals = appointments_per_doctor(&conn).unwrap();
        let names: Vec<&str> = totals.iter().filter_map(|t| t.nombre.as_deref()).collect();
        assert_eq!(names, vec!["Dr. A", "Dr. B"]);
        assert!(totals.iter().all(|t| t.total == 0));
    }

    #[test]
    fn test_specialty_counts() {
        let conn = fixtures::demo_db();
        let counts = specialty_counts(&conn).unwrap();
        assert_eq!(counts[0], LabeledCount { label: "Cardiología".into(), count: 2 });
        assert_eq!(counts.iter().map(|c| c.count).sum::<i64>(), 6);
    }

    #[test]
    fn test_null_specialty_is_its_own_group() {
        let conn = fixtures::unconstrained_db();
        conn.execute("INSERT INTO doctores (nombre, especialidad) VALUES ('Dr. Sin', NULL)", [])
            .unwrap();
        let known = fixtures::add_doctor(&conn, "Dr. Con", "Pediatría");
        let p = fixtures::add_patient(&conn, "Ana", "1990-01-01");
        fixtures::add_appointment(&conn, "2024-01-01", "09:00", "Completada", known, p);

        let doctors = Doctor::list_all(&conn).unwrap();
        assert_eq!(doctors.len(), 2);
        assert_eq!(doctors[0].especialidad, None);

        let counts = specialty_counts(&conn).unwrap();
        assert_eq!(counts.len(), 2);
        assert!(counts.contains(&LabeledCount { label: MISSING_LABEL.into(), count: 1 }));

        let totals = appointments_per_doctor(&conn).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[1].nombre.as_deref(), Some("Dr. Sin"));
        assert_eq!((totals[1].especialidad.as_deref(), totals[1].total), (None, 0));
    }
}
