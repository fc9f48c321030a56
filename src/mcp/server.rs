//! Dashboard MCP Server Implementation
//!
//! Every aggregate the dashboard charts is available as a tool returning
//! pretty-printed JSON, so an assistant can read the numbers directly.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::build_info::BuildInfo;
use crate::db::{Database, DbResult};
use crate::export::{self, ExportError};
use crate::filter::AppointmentFilter;
use crate::models::{Appointment, Doctor, Patient, Service};
use crate::reports::{appointments, doctors, patients, services};

/// Dashboard MCP Service
#[derive(Clone)]
pub struct DashboardMcpService {
    database: Database,
    tool_router: ToolRouter<DashboardMcpService>,
}

impl DashboardMcpService {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            tool_router: Self::tool_router(),
        }
    }

    fn query<T, F>(&self, f: F) -> Result<T, McpError>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T>,
    {
        self.database
            .with_conn(f)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct AppointmentFilterParams {
    /// Appointment status to match exactly (omit, "All" or "Todos" for any)
    pub status: Option<String>,
    /// Doctor name to match exactly (omit for any)
    pub doctor: Option<String>,
    /// Calendar day in ISO format: YYYY-MM-DD (omit for any)
    pub date: Option<String>,
}

impl AppointmentFilterParams {
    fn to_filter(&self) -> Result<AppointmentFilter, McpError> {
        AppointmentFilter::from_raw(
            self.status.as_deref(),
            self.doctor.as_deref(),
            self.date.as_deref(),
        )
        .map_err(|e| McpError::invalid_params(e.to_string(), None))
    }
}

// ============================================================================
// Response Structs
// ============================================================================

#[derive(Debug, Serialize)]
struct TableStatus {
    table: &'static str,
    rows: Option<i64>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct DashboardStatus {
    build: BuildInfo,
    database_path: String,
    tables: Vec<TableStatus>,
}

#[derive(Debug, Serialize)]
struct AppointmentSummary {
    filter: AppointmentFilter,
    total: usize,
    by_status: Vec<crate::reports::LabeledCount>,
    by_day: Vec<appointments::DailyCount>,
    by_hour: Vec<appointments::HourlyCount>,
    top_doctors: Vec<crate::reports::LabeledCount>,
}

#[derive(Debug, Serialize)]
struct FilterOptions {
    statuses: Vec<String>,
    doctors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DoctorSummary {
    by_specialty: Vec<crate::reports::LabeledCount>,
    appointments_per_doctor: Vec<doctors::DoctorTotal>,
}

#[derive(Debug, Serialize)]
struct PatientSummary {
    without_appointments: Vec<Patient>,
    by_birth_year: Vec<patients::BirthYearCount>,
    top_patients: Vec<crate::reports::LabeledCount>,
}

#[derive(Debug, Serialize)]
struct ServiceSummary {
    by_type: Vec<crate::reports::LabeledCount>,
    most_expensive: Vec<services::ServiceCost>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl DashboardMcpService {
    #[tool(description = "Get build info, the database path and the row count of each hospital table")]
    fn dashboard_status(&self) -> Result<CallToolResult, McpError> {
        let tables = self.query(|conn| {
            Ok([Appointment::TABLE, Doctor::TABLE, Patient::TABLE, Service::TABLE]
                .into_iter()
                .map(|table| {
                    let sql = format!("SELECT COUNT(*) FROM {}", table);
                    match conn.query_row(&sql, [], |row| row.get::<_, i64>(0)) {
                        Ok(rows) => TableStatus { table, rows: Some(rows), error: None },
                        Err(e) => TableStatus { table, rows: None, error: Some(e.to_string()) },
                    }
                })
                .collect::<Vec<_>>())
        })?;

        to_json(&DashboardStatus {
            build: BuildInfo::current(),
            database_path: self.database.path().display().to_string(),
            tables,
        })
    }

    #[tool(description = "List the distinct appointment statuses and doctor names usable as filter values")]
    fn filter_options(&self) -> Result<CallToolResult, McpError> {
        let options = self.query(|conn| {
            Ok(FilterOptions {
                statuses: appointments::status_options(conn)?,
                doctors: appointments::doctor_options(conn)?,
            })
        })?;
        to_json(&options)
    }

    #[tool(description = "List appointments with patient and doctor names, filtered by status, doctor and date")]
    fn filtered_appointments(&self, Parameters(p): Parameters<AppointmentFilterParams>) -> Result<CallToolResult, McpError> {
        let filter = p.to_filter()?;
        let rows = self.query(|conn| appointments::filtered_appointments(conn, &filter))?;
        to_json(&rows)
    }

    #[tool(description = "Summarize filtered appointments: counts by status, by day, by hour, and the top 5 doctors")]
    fn appointment_summary(&self, Parameters(p): Parameters<AppointmentFilterParams>) -> Result<CallToolResult, McpError> {
        let filter = p.to_filter()?;
        let summary = self.query(|conn| {
            let by_status = appointments::status_counts(conn, &filter)?;
            Ok(AppointmentSummary {
                total: by_status.iter().map(|s| s.count as usize).sum(),
                by_status,
                by_day: appointments::daily_counts(conn, &filter)?,
                by_hour: appointments::hourly_counts(conn, &filter)?,
                top_doctors: appointments::top_doctors(conn, &filter)?,
                filter: filter.clone(),
            })
        })?;
        to_json(&summary)
    }

    #[tool(description = "Export filtered appointments as CSV text (id, fecha, hora, estado, paciente, doctor)")]
    fn export_appointments_csv(&self, Parameters(p): Parameters<AppointmentFilterParams>) -> Result<CallToolResult, McpError> {
        let filter = p.to_filter()?;
        let rows = self.query(|conn| appointments::filtered_appointments(conn, &filter))?;
        if rows.is_empty() {
            return Ok(CallToolResult::success(vec![Content::text(
                export::EMPTY_EXPORT_MESSAGE,
            )]));
        }
        let csv = export::to_csv(&rows)
            .and_then(|bytes| {
                String::from_utf8(bytes).map_err(|e| ExportError::CsvBuffer(e.to_string()))
            })
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(csv)]))
    }

    #[tool(description = "Doctors per specialty and total appointments per doctor")]
    fn doctor_summary(&self) -> Result<CallToolResult, McpError> {
        let summary = self.query(|conn| {
            Ok(DoctorSummary {
                by_specialty: doctors::specialty_counts(conn)?,
                appointments_per_doctor: doctors::appointments_per_doctor(conn)?,
            })
        })?;
        to_json(&summary)
    }

    #[tool(description = "Patients without appointments, patients per birth year, and the top 5 patients by appointments")]
    fn patient_summary(&self) -> Result<CallToolResult, McpError> {
        let summary = self.query(|conn| {
            Ok(PatientSummary {
                without_appointments: patients::patients_without_appointments(conn)?,
                by_birth_year: patients::birth_year_distribution(conn)?,
                top_patients: patients::top_patients(conn)?,
            })
        })?;
        to_json(&summary)
    }

    #[tool(description = "Services per type and the 10 most expensive services")]
    fn service_summary(&self) -> Result<CallToolResult, McpError> {
        let summary = self.query(|conn| {
            Ok(ServiceSummary {
                by_type: services::service_type_counts(conn)?,
                most_expensive: services::top_services_by_cost(conn)?,
            })
        })?;
        to_json(&summary)
    }
}

#[tool_handler]
impl ServerHandler for DashboardMcpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "hospital-dashboard".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Hospital Dashboard".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Hospital Dashboard - read-only analytics over citas, doctores, pacientes and servicios. \
                 Call filter_options first to learn valid status and doctor values. \
                 Appointments: filtered_appointments, appointment_summary, export_appointments_csv \
                 (all accept optional status, doctor and date YYYY-MM-DD). \
                 Other tabs: doctor_summary, patient_summary, service_summary. \
                 Health: dashboard_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::{create_schema, insert_demo_data};
    use rusqlite::Connection;

    fn demo_service() -> (tempfile::TempDir, DashboardMcpService) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hospital.db");
        {
            let conn = Connection::open(&path).unwrap();
            create_schema(&conn).unwrap();
            insert_demo_data(&conn).unwrap();
        }
        let database = Database::open_read_only(&path).unwrap();
        (dir, DashboardMcpService::new(database))
    }

    #[test]
    fn test_filter_params_reject_bad_date() {
        let params = AppointmentFilterParams {
            date: Some("tomorrow".into()),
            ..Default::default()
        };
        assert!(params.to_filter().is_err());
    }

    #[test]
    fn test_query_runs_against_database() {
        let (_dir, service) = demo_service();
        let filter = AppointmentFilter {
            status: Some("Pendiente".into()),
            ..Default::default()
        };
        let rows = service
            .query(|conn| appointments::filtered_appointments(conn, &filter))
            .unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_server_info_lists_tools() {
        let (_dir, service) = demo_service();
        let info = service.get_info();
        assert_eq!(info.server_info.name, "hospital-dashboard");
        assert!(info
            .instructions
            .unwrap_or_default()
            .contains("appointment_summary"));
    }
}
