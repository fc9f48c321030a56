//! Appointment reports
//!
//! Every query here accepts the dashboard filter and shares the same join,
//! so totals agree across the status chart, the table and the exports.

use rusqlite::{Connection, Row};
use serde::Serialize;

use super::{query_all, query_filtered, LabeledCount, TOP_DOCTORS};
use crate::db::DbResult;
use crate::filter::AppointmentFilter;

/// Appointments joined to their patient and doctor; dangling references
/// keep the appointment with a NULL name.
const APPOINTMENT_JOIN: &str = "FROM citas c
     LEFT JOIN pacientes p ON p.id = c.paciente_id
     LEFT JOIN doctores d ON d.id = c.doctor_id";

/// One row of the filtered appointment table and its exports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentDetail {
    pub id: i64,
    pub fecha: Option<String>,
    pub hora: Option<String>,
    pub estado: Option<String>,
    pub paciente: Option<String>,
    pub doctor: Option<String>,
}

impl AppointmentDetail {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            fecha: row.get("fecha")?,
            hora: row.get("hora")?,
            estado: row.get("estado")?,
            paciente: row.get("paciente")?,
            doctor: row.get("doctor")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    /// ISO date
    pub day: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyCount {
    /// Hour of day, 0-23
    pub hour: u32,
    pub count: i64,
}

/// Filtered appointment join, ascending by date
pub fn filtered_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
) -> DbResult<Vec<AppointmentDetail>> {
    query_filtered(
        conn,
        &format!(
            "SELECT c.id AS id, c.fecha AS fecha, c.hora AS hora, c.estado AS estado,
                    p.nombre AS paciente, d.nombre AS doctor
             {}",
            APPOINTMENT_JOIN
        ),
        &filter.to_clause(),
        "ORDER BY date(c.fecha) ASC, c.fecha ASC, c.hora ASC, c.id ASC",
        AppointmentDetail::from_row,
    )
}

/// Appointment count per status
pub fn status_counts(conn: &Connection, filter: &AppointmentFilter) -> DbResult<Vec<LabeledCount>> {
    query_filtered(
        conn,
        &format!("SELECT c.estado, COUNT(*) AS total {}", APPOINTMENT_JOIN),
        &filter.to_clause(),
        "GROUP BY c.estado ORDER BY total DESC, c.estado ASC",
        LabeledCount::from_row,
    )
}

/// Appointment count per calendar day, ascending
pub fn daily_counts(conn: &Connection, filter: &AppointmentFilter) -> DbResult<Vec<DailyCount>> {
    query_filtered(
        conn,
        &format!("SELECT date(c.fecha) AS day, COUNT(*) AS total {}", APPOINTMENT_JOIN),
        &filter.to_clause().and("date(c.fecha) IS NOT NULL"),
        "GROUP BY day ORDER BY day ASC",
        |row| {
            Ok(DailyCount {
                day: row.get(0)?,
                count: row.get(1)?,
            })
        },
    )
}

/// Appointment count per hour of day, ascending
///
/// The hour is the text before the first `:`, so "9:00", "09:00" and
/// "09:00:00" all land in hour 9. Values that don't give 0-23 are left out.
pub fn hourly_counts(conn: &Connection, filter: &AppointmentFilter) -> DbResult<Vec<HourlyCount>> {
    query_filtered(
        conn,
        &format!(
            "SELECT CAST(substr(c.hora, 1, instr(c.hora, ':') - 1) AS INTEGER) AS hour,
                    COUNT(*) AS total
             {}",
            APPOINTMENT_JOIN
        ),
        &filter
            .to_clause()
            .and("instr(c.hora, ':') BETWEEN 2 AND 3")
            .and("substr(c.hora, 1, instr(c.hora, ':') - 1) NOT GLOB '*[^0-9]*'")
            .and("CAST(substr(c.hora, 1, instr(c.hora, ':') - 1) AS INTEGER) BETWEEN 0 AND 23"),
        "GROUP BY hour ORDER BY hour ASC",
        |row| {
            Ok(HourlyCount {
                hour: row.get(0)?,
                count: row.get(1)?,
            })
        },
    )
}

/// Top doctors by appointment count; ties ordered by name
pub fn top_doctors(conn: &Connection, filter: &AppointmentFilter) -> DbResult<Vec<LabeledCount>> {
    query_filtered(
        conn,
        &format!("SELECT d.nombre, COUNT(*) AS total {}", APPOINTMENT_JOIN),
        &filter.to_clause().and("d.id IS NOT NULL"),
        &format!(
            "GROUP BY d.id ORDER BY total DESC, d.nombre ASC LIMIT {}",
            TOP_DOCTORS
        ),
        LabeledCount::from_row,
    )
}

/// Distinct statuses for the status dropdown
pub fn status_options(conn: &Connection) -> DbResult<Vec<String>> {
    query_all(
        conn,
        "SELECT DISTINCT estado FROM citas WHERE estado IS NOT NULL ORDER BY estado",
        |row| row.get(0),
    )
}

/// Doctor names for the doctor dropdown
pub fn doctor_options(conn: &Connection) -> DbResult<Vec<String>> {
    query_all(
        conn,
        "SELECT DISTINCT nombre FROM doctores WHERE nombre IS NOT NULL ORDER BY nombre",
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::fixtures;
    use crate::reports::MISSING_LABEL;
    use chrono::NaiveDate;

    fn total(counts: &[LabeledCount]) -> i64 {
        counts.iter().map(|c| c.count).sum()
    }

    #[test]
    fn test_status_counts_sum_to_total() {
        let conn = fixtures::demo_db();
        let counts = status_counts(&conn, &AppointmentFilter::default()).unwrap();
        let all: i64 = conn
            .query_row("SELECT COUNT(*) FROM citas", [], |r| r.get(0))
            .unwrap();
        assert_eq!(total(&counts), all);
        assert_eq!(counts[0].label, "Completada");
    }

    #[test]
    fn test_status_counts_include_dangling_references() {
        let conn = fixtures::unconstrained_db();
        let d = fixtures::add_doctor(&conn, "Dr. A", "General");
        let p = fixtures::add_patient(&conn, "Ana", "1990-01-01");
        fixtures::add_appointment(&conn, "2024-01-01", "09:00", "Completada", d, p);
        fixtures::add_appointment(&conn, "2024-01-01", "10:00", "Completada", 999, p);

        let counts = status_counts(&conn, &AppointmentFilter::default()).unwrap();
        assert_eq!(total(&counts), 2);

        let rows = filtered_appointments(&conn, &AppointmentFilter::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].doctor, None);
        assert_eq!(rows[1].paciente.as_deref(), Some("Ana"));

        // the dangling row has no doctor to rank
        let top = top_doctors(&conn, &AppointmentFilter::default()).unwrap();
        assert_eq!(top, vec![LabeledCount { label: "Dr. A".into(), count: 1 }]);
    }

    #[test]
    fn test_null_columns_keep_their_rows() {
        let conn = fixtures::unconstrained_db();
        let d = fixtures::add_doctor(&conn, "Dr. A", "General");
        let p = fixtures::add_patient(&conn, "Ana", "1990-01-01");
        fixtures::add_appointment(&conn, "2024-01-01", "09:00", "Completada", d, p);
        conn.execute(
            "INSERT INTO citas (fecha, hora, estado, doctor_id, paciente_id)
             VALUES ('2024-01-02', NULL, NULL, ?1, ?2)",
            [d, p],
        )
        .unwrap();

        let filter = AppointmentFilter::default();
        let rows = filtered_appointments(&conn, &filter).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].estado, None);
        assert_eq!(rows[1].hora, None);

        let counts = status_counts(&conn, &filter).unwrap();
        assert_eq!(total(&counts), 2);
        assert!(counts.iter().any(|c| c.label == MISSING_LABEL && c.count == 1));

        assert_eq!(daily_counts(&conn, &filter).unwrap().len(), 2);
        assert_eq!(status_options(&conn).unwrap(), vec!["Completada"]);
    }

    #[test]
    fn test_filtered_rows_match_status_total_for_every_filter() {
        let conn = fixtures::demo_db();
        let statuses = [None, Some("Completada"), Some("Pendiente"), Some("Nope")];
        let doctors = [None, Some("Dra. Ana Torres"), Some("Dr. Luis Gómez")];
        let dates = [None, NaiveDate::from_ymd_opt(2024, 1, 8), NaiveDate::from_ymd_opt(2024, 1, 11)];

        for status in statuses {
            for doctor in doctors {
                for date in dates {
                    let filter = AppointmentFilter {
                        status: status.map(String::from),
                        doctor: doctor.map(String::from),
                        date,
                    };
                    let rows = filtered_appointments(&conn, &filter).unwrap();
                    let counts = status_counts(&conn, &filter).unwrap();
                    assert_eq!(rows.len() as i64, total(&counts), "filter {:?}", filter);
                }
            }
        }
    }

    #[test]
    fn test_filter_matches_all_three_predicates_in_date_order() {
        let conn = fixtures::empty_db();
        let a = fixtures::add_doctor(&conn, "Dr. A", "General");
        let b = fixtures::add_doctor(&conn, "Dr. B", "General");
        let p = fixtures::add_patient(&conn, "Ana", "1990-01-01");
        let q = fixtures::add_patient(&conn, "Beto", "1991-01-01");

        let keep_late = fixtures::add_appointment(&conn, "2024-01-01", "15:00", "Completed", a, q);
        let keep_early = fixtures::add_appointment(&conn, "2024-01-01", "08:00", "Completed", a, p);
        fixtures::add_appointment(&conn, "2024-01-01", "09:00", "Cancelled", a, p);
        fixtures::add_appointment(&conn, "2024-01-01", "09:00", "Completed", b, p);
        fixtures::add_appointment(&conn, "2024-01-02", "09:00", "Completed", a, p);

        let filter = AppointmentFilter {
            status: Some("Completed".into()),
            doctor: Some("Dr. A".into()),
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
        };
        let rows = filtered_appointments(&conn, &filter).unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![keep_early, keep_late]);
        assert!(rows.iter().all(|r| r.estado.as_deref() == Some("Completed")
            && r.doctor.as_deref() == Some("Dr. A")
            && r.fecha.as_deref() == Some("2024-01-01")));
    }

    #[test]
    fn test_filtered_appointments_ascending_by_date() {
        let conn = fixtures::demo_db();
        let rows = filtered_appointments(&conn, &AppointmentFilter::default()).unwrap();
        assert!(rows.windows(2).all(|w| w[0].fecha <= w[1].fecha));
    }

    #[test]
    fn test_date_filter_matches_datetime_values() {
        let conn = fixtures::empty_db();
        let d = fixtures::add_doctor(&conn, "Dr. A", "General");
        let p = fixtures::add_patient(&conn, "Ana", "1990-01-01");
        fixtures::add_appointment(&conn, "2024-01-01 00:00:00", "09:00", "Completada", d, p);

        let filter = AppointmentFilter {
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert_eq!(filtered_appointments(&conn, &filter).unwrap().len(), 1);
    }

    #[test]
    fn test_filter_value_is_matched_literally() {
        let conn = fixtures::demo_db();
        let filter = AppointmentFilter {
            status: Some("x' OR '1'='1".into()),
            ..Default::default()
        };
        assert!(filtered_appointments(&conn, &filter).unwrap().is_empty());
        assert!(status_counts(&conn, &filter).unwrap().is_empty());
    }

    #[test]
    fn test_daily_counts_ascending() {
        let conn = fixtures::demo_db();
        let days = daily_counts(&conn, &AppointmentFilter::default()).unwrap();
        assert_eq!(days.first().map(|d| d.day.as_str()), Some("2024-01-08"));
        assert!(days.windows(2).all(|w| w[0].day < w[1].day));
        assert_eq!(days.iter().map(|d| d.count).sum::<i64>(), 12);
    }

    #[test]
    fn test_hourly_counts_bucket_by_hour() {
        let conn = fixtures::empty_db();
        let d = fixtures::add_doctor(&conn, "Dr. A", "General");
        let p = fixtures::add_patient(&conn, "Ana", "1990-01-01");
        fixtures::add_appointment(&conn, "2024-01-01", "09:00", "Completada", d, p);
        fixtures::add_appointment(&conn, "2024-01-01", "09:45:00", "Completada", d, p);
        fixtures::add_appointment(&conn, "2024-01-01", "23:10", "Completada", d, p);
        fixtures::add_appointment(&conn, "2024-01-01", "00:05", "Completada", d, p);
        fixtures::add_appointment(&conn, "2024-01-01", "later", "Completada", d, p);
        fixtures::add_appointment(&conn, "2024-01-01", "25:00", "Completada", d, p);

        let hours = hourly_counts(&conn, &AppointmentFilter::default()).unwrap();
        assert_eq!(
            hours,
            vec![
                HourlyCount { hour: 0, count: 1 },
                HourlyCount { hour: 9, count: 2 },
                HourlyCount { hour: 23, count: 1 },
            ]
        );
    }

    #[test]
    fn test_hourly_counts_accept_single_digit_hours() {
        let conn = fixtures::empty_db();
        let d = fixtures::add_doctor(&conn, "Dr. A", "General");
        let p = fixtures::add_patient(&conn, "Ana", "1990-01-01");
        fixtures::add_appointment(&conn, "2024-01-01", "9:00", "Completada", d, p);
        fixtures::add_appointment(&conn, "2024-01-01", "10:00", "Completada", d, p);
        fixtures::add_appointment(&conn, "2024-01-01", "09:30", "Pendiente", d, p);

        let filter = AppointmentFilter::default();
        let hours = hourly_counts(&conn, &filter).unwrap();
        assert_eq!(
            hours,
            vec![
                HourlyCount { hour: 9, count: 2 },
                HourlyCount { hour: 10, count: 1 },
            ]
        );
        let hourly_total: i64 = hours.iter().map(|h| h.count).sum();
        assert_eq!(hourly_total, total(&status_counts(&conn, &filter).unwrap()));
    }

    #[test]
    fn test_top_doctors_limited_and_non_increasing() {
        let conn = fixtures::empty_db();
        let p = fixtures::add_patient(&conn, "Ana", "1990-01-01");
        for (i, name) in ["F", "E", "D", "C", "B", "A", "G"].iter().enumerate() {
            let d = fixtures::add_doctor(&conn, name, "General");
            for _ in 0..(i % 3 + 1) {
                fixtures::add_appointment(&conn, "2024-01-01", "09:00", "Completada", d, p);
            }
        }

        let top = top_doctors(&conn, &AppointmentFilter::default()).unwrap();
        assert_eq!(top.len(), TOP_DOCTORS);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
        // D and A both have 3; name breaks the tie
        assert_eq!(top[0].label, "A");
        assert_eq!(top[1].label, "D");
    }

    #[test]
    fn test_empty_table_yields_empty_reports() {
        let conn = fixtures::empty_db();
        let filter = AppointmentFilter::default();
        assert!(status_counts(&conn, &filter).unwrap().is_empty());
        assert!(daily_counts(&conn, &filter).unwrap().is_empty());
        assert!(hourly_counts(&conn, &filter).unwrap().is_empty());
        assert!(top_doctors(&conn, &filter).unwrap().is_empty());
        assert!(filtered_appointments(&conn, &filter).unwrap().is_empty());
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(status_counts(&conn, &AppointmentFilter::default()).is_err());
    }

    #[test]
    fn test_dropdown_options() {
        let conn = fixtures::demo_db();
        assert_eq!(
            status_options(&conn).unwrap(),
            vec!["Cancelada", "Completada", "Pendiente"]
        );
        let doctors = doctor_options(&conn).unwrap();
        assert_eq!(doctors.len(), 6);
        assert!(doctors.windows(2).all(|w| w[0] <= w[1]));
    }
}
