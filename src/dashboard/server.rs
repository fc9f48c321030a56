//! HTTP surface
//!
//! `GET /` renders the dashboard for the filter in the query string,
//! `GET /export/{file_name}` downloads the filtered appointments and
//! `GET /health` reports liveness.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::task::JoinError;
use tower_http::trace::TraceLayer;

use crate::build_info;
use crate::db::{Database, DbError};
use crate::export::{ExportError, ExportFormat};
use crate::filter::{AppointmentFilter, FilterError};
use crate::reports::appointments;

use super::page::{render_page, DashboardData};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub show_error_detail: bool,
}

/// Request-level failures; section failures never get this far
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Background task failed: {0}")]
    Task(#[from] JoinError),
}

impl From<FilterError> for DashboardError {
    fn from(err: FilterError) -> Self {
        DashboardError::BadRequest(err.to_string())
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            DashboardError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            DashboardError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            DashboardError::Export(ExportError::Empty) => (
                StatusCode::NOT_FOUND,
                "EMPTY_EXPORT",
                ExportError::Empty.to_string(),
            ),
            other => {
                tracing::error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}

type DashboardResult<T> = Result<T, DashboardError>;

/// Raw filter selections as they arrive from the form
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub status: Option<String>,
    pub doctor: Option<String>,
    pub date: Option<String>,
}

impl FilterParams {
    pub fn into_filter(self) -> Result<AppointmentFilter, FilterError> {
        AppointmentFilter::from_raw(
            self.status.as_deref(),
            self.doctor.as_deref(),
            self.date.as_deref(),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/export/{file_name}", get(export_appointments))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dashboard_page(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> DashboardResult<Html<String>> {
    let filter = params.into_filter()?;
    tracing::debug!(?filter, "rendering dashboard");

    let html = tokio::task::spawn_blocking(move || {
        state.database.with_conn(|conn| {
            let data = DashboardData::load(conn, &filter);
            Ok(render_page(&data, &filter, state.show_error_detail))
        })
    })
    .await??;

    Ok(Html(html))
}

async fn export_appointments(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
    Query(params): Query<FilterParams>,
) -> DashboardResult<Response> {
    let format = ExportFormat::from_file_name(&file_name)
        .ok_or_else(|| DashboardError::NotFound(format!("No export named '{}'", file_name)))?;
    let filter = params.into_filter()?;

    let bytes = tokio::task::spawn_blocking(move || -> DashboardResult<Vec<u8>> {
        let rows = state
            .database
            .with_conn(|conn| appointments::filtered_appointments(conn, &filter))?;
        tracing::info!(format = format.file_name(), rows = rows.len(), "exporting appointments");
        Ok(format.encode(&rows)?)
    })
    .await??;

    let disposition = format!("attachment; filename=\"{}\"", format.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": build_info::VERSION,
        "build_number": build_info::BUILD_NUMBER,
        "database": state.database.path().display().to_string(),
    }))
}
