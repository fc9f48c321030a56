//! Filtered appointment exports
//!
//! CSV and XLSX encodings of the same `filtered_appointments` rows.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

use crate::reports::appointments::AppointmentDetail;

pub const CSV_FILE_NAME: &str = "citas_filtradas.csv";
pub const XLSX_FILE_NAME: &str = "citas_filtradas.xlsx";

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Shown instead of download links when there is nothing to export
pub const EMPTY_EXPORT_MESSAGE: &str =
    "No appointments match the current filters; nothing to export.";

const HEADERS: [&str; 6] = ["id", "fecha", "hora", "estado", "paciente", "doctor"];
const SHEET_NAME: &str = "citas";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer error: {0}")]
    CsvBuffer(String),

    #[error("XLSX encoding failed: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("{}", EMPTY_EXPORT_MESSAGE)]
    Empty,
}

/// Export format selected by the download route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            CSV_FILE_NAME => Some(ExportFormat::Csv),
            XLSX_FILE_NAME => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_FILE_NAME,
            ExportFormat::Xlsx => XLSX_FILE_NAME,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => CSV_CONTENT_TYPE,
            ExportFormat::Xlsx => XLSX_CONTENT_TYPE,
        }
    }

    /// Encode rows; an empty row set is refused
    pub fn encode(&self, rows: &[AppointmentDetail]) -> Result<Vec<u8>, ExportError> {
        if rows.is_empty() {
            return Err(ExportError::Empty);
        }
        match self {
            ExportFormat::Csv => to_csv(rows),
            ExportFormat::Xlsx => to_xlsx(rows),
        }
    }
}

/// Delimited-text encoding with a header row
pub fn to_csv(rows: &[AppointmentDetail]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for row in rows {
        let id = row.id.to_string();
        writer.write_record([
            id.as_str(),
            row.fecha.as_deref().unwrap_or(""),
            row.hora.as_deref().unwrap_or(""),
            row.estado.as_deref().unwrap_or(""),
            row.paciente.as_deref().unwrap_or(""),
            row.doctor.as_deref().unwrap_or(""),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::CsvBuffer(e.to_string()))
}

/// Spreadsheet encoding: one worksheet, bold header row
pub fn to_xlsx(rows: &[AppointmentDetail]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_number(r, 0, row.id as f64)?;
        // NULL columns stay blank cells
        let text_cells = [&row.fecha, &row.hora, &row.estado, &row.paciente, &row.doctor];
        for (offset, cell) in text_cells.into_iter().enumerate() {
            if let Some(value) = cell {
                worksheet.write_string(r, offset as u16 + 1, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
