//! Appointment filter builder
//!
//! Turns the three optional dashboard selections into a conjunctive SQL
//! predicate with bound parameters. The predicate assumes the appointment
//! join aliases used by the reports: `c` for `citas`, `d` for `doctores`.

use chrono::NaiveDate;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Dropdown sentinels that mean "no constraint"
const ALL_SENTINELS: [&str; 2] = ["all", "todos"];

/// Date format used by the date picker and the `fecha` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// User selections on the appointments tab; `None` means "all"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub status: Option<String>,
    pub doctor: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

impl AppointmentFilter {
    /// Build a filter from raw form values
    ///
    /// Blank values and the "All"/"Todos" sentinels are treated as unset.
    pub fn from_raw(
        status: Option<&str>,
        doctor: Option<&str>,
        date: Option<&str>,
    ) -> Result<Self, FilterError> {
        let date = match normalize(date) {
            Some(raw) => Some(
                NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                    .map_err(|_| FilterError::InvalidDate(raw.clone()))?,
            ),
            None => None,
        };

        Ok(Self {
            status: normalize(status),
            doctor: normalize(doctor),
            date,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.doctor.is_none() && self.date.is_none()
    }

    /// Predicate and parameters for the fields that are set
    pub fn to_clause(&self) -> FilterClause {
        let mut clause = FilterClause::default();
        if let Some(status) = &self.status {
            clause.push("c.estado = ?", Value::Text(status.clone()));
        }
        if let Some(doctor) = &self.doctor {
            clause.push("d.nombre = ?", Value::Text(doctor.clone()));
        }
        if let Some(date) = &self.date {
            clause.push(
                "date(c.fecha) = ?",
                Value::Text(date.format(DATE_FORMAT).to_string()),
            );
        }
        clause
    }

    /// Query-string form of the filter, for links that must keep it
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(status) = &self.status {
            pairs.push(format!("status={}", urlencoding::encode(status)));
        }
        if let Some(doctor) = &self.doctor {
            pairs.push(format!("doctor={}", urlencoding::encode(doctor)));
        }
        if let Some(date) = &self.date {
            pairs.push(format!("date={}", date.format(DATE_FORMAT)));
        }
        pairs.join("&")
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || ALL_SENTINELS.contains(&trimmed.to_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A conjunction of SQL conditions with positional `?` parameters
#[derive(Debug, Clone, Default)]
pub struct FilterClause {
    conditions: Vec<&'static str>,
    params: Vec<Value>,
}

impl FilterClause {
    fn push(&mut self, condition: &'static str, value: Value) {
        self.conditions.push(condition);
        self.params.push(value);
    }

    /// Conjoin a fixed, parameterless condition
    pub fn and(mut self, condition: &'static str) -> Self {
        self.conditions.push(condition);
        self
    }

    /// The bare boolean fragment, empty when nothing is set
    pub fn predicate(&self) -> String {
        self.conditions.join(" AND ")
    }

    /// `WHERE <predicate>` with a leading space, or empty
    pub fn where_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.predicate())
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_where() {
        let clause = AppointmentFilter::default().to_clause();
        assert_eq!(clause.predicate(), "");
        assert_eq!(clause.where_sql(), "");
        assert!(clause.params().is_empty());
    }

    #[test]
    fn test_only_set_fields_are_conjoined() {
        let filter = AppointmentFilter {
            status: Some("Completada".into()),
            doctor: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
        };
        let clause = filter.to_clause();
        assert_eq!(clause.predicate(), "c.estado = ? AND date(c.fecha) = ?");
        assert_eq!(
            clause.params(),
            &[
                Value::Text("Completada".into()),
                Value::Text("2024-01-01".into())
            ]
        );
    }

    #[test]
    fn test_fixed_condition_joins_user_predicate() {
        let filter = AppointmentFilter {
            doctor: Some("Dr. A".into()),
            ..Default::default()
        };
        let clause = filter.to_clause().and("d.id IS NOT NULL");
        assert_eq!(clause.where_sql(), " WHERE d.nombre = ? AND d.id IS NOT NULL");
        assert_eq!(clause.params().len(), 1);
    }

    #[test]
    fn test_from_raw_treats_sentinels_as_unset() {
        let filter = AppointmentFilter::from_raw(Some("All"), Some("  "), Some("")).unwrap();
        assert!(filter.is_empty());

        let filter = AppointmentFilter::from_raw(Some("Todos"), None, None).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_from_raw_parses_date() {
        let filter =
            AppointmentFilter::from_raw(Some("Pendiente"), Some("Dr. A"), Some("2024-03-05"))
                .unwrap();
        assert_eq!(filter.status.as_deref(), Some("Pendiente"));
        assert_eq!(filter.doctor.as_deref(), Some("Dr. A"));
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn test_from_raw_rejects_bad_date() {
        let err = AppointmentFilter::from_raw(None, None, Some("05/03/2024")).unwrap_err();
        assert_eq!(err, FilterError::InvalidDate("05/03/2024".into()));
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let filter = AppointmentFilter {
            status: Some("x' OR '1'='1".into()),
            ..Default::default()
        };
        let clause = filter.to_clause();
        assert!(!clause.predicate().contains("OR"));
        assert_eq!(clause.params(), &[Value::Text("x' OR '1'='1".into())]);
    }

    #[test]
    fn test_query_string_encodes_values() {
        let filter = AppointmentFilter {
            status: Some("Completada".into()),
            doctor: Some("Dra. Ana Torres".into()),
            date: NaiveDate::from_ymd_opt(2024, 1, 8),
        };
        assert_eq!(
            filter.to_query_string(),
            "status=Completada&doctor=Dra.%20Ana%20Torres&date=2024-01-08"
        );
        assert_eq!(AppointmentFilter::default().to_query_string(), "");
    }

    #[test]
    fn test_query_string_escapes_reserved_characters() {
        let filter = AppointmentFilter {
            status: Some("A&B=C".into()),
            doctor: Some("Dr. Muñoz".into()),
            ..Default::default()
        };
        assert_eq!(
            filter.to_query_string(),
            "status=A%26B%3DC&doctor=Dr.%20Mu%C3%B1oz"
        );
    }
}
