//! Page rendering
//!
//! [`DashboardData::load`] runs every section against one connection;
//! [`render_page`] turns the result into the tabbed HTML page.

use rusqlite::Connection;

use crate::build_info::BuildInfo;
use crate::charts::{self, ChartKind, ChartSeries, ChartView};
use crate::export::{ExportFormat, EMPTY_EXPORT_MESSAGE};
use crate::filter::{AppointmentFilter, DATE_FORMAT};
use crate::models::{Appointment, Doctor, Patient, Service};
use crate::reports::appointments::{self, AppointmentDetail, DailyCount, HourlyCount};
use crate::reports::doctors::{self, DoctorTotal};
use crate::reports::patients::{self, BirthYearCount};
use crate::reports::services::{self, ServiceCost};
use crate::reports::{LabeledCount, MISSING_LABEL};

use super::section::{load_section, Section};

pub const NO_DATA: &str = "No data available";

/// Everything the page shows, each part loaded independently
#[derive(Debug)]
pub struct DashboardData {
    pub status_options: Section<Vec<String>>,
    pub doctor_options: Section<Vec<String>>,
    pub appointments: Section<Vec<AppointmentDetail>>,
    pub status_counts: Section<Vec<LabeledCount>>,
    pub daily_counts: Section<Vec<DailyCount>>,
    pub hourly_counts: Section<Vec<HourlyCount>>,
    pub top_doctors: Section<Vec<LabeledCount>>,
    /// `citas` as stored, unfiltered
    pub raw_appointments: Section<Vec<Appointment>>,

    pub doctors: Section<Vec<Doctor>>,
    pub specialty_counts: Section<Vec<LabeledCount>>,
    pub per_doctor: Section<Vec<DoctorTotal>>,

    pub patients: Section<Vec<Patient>>,
    pub without_appointments: Section<Vec<Patient>>,
    pub birth_years: Section<Vec<BirthYearCount>>,
    pub top_patients: Section<Vec<LabeledCount>>,

    pub services: Section<Vec<Service>>,
    pub service_types: Section<Vec<LabeledCount>>,
    pub top_services: Section<Vec<ServiceCost>>,
}

// Tables each section reads, primary table first
const CITAS: &[&str] = &[Appointment::TABLE];
const CITAS_JOINED: &[&str] = &[Appointment::TABLE, Patient::TABLE, Doctor::TABLE];
const DOCTORES: &[&str] = &[Doctor::TABLE];
const DOCTORES_CITAS: &[&str] = &[Doctor::TABLE, Appointment::TABLE];
const PACIENTES: &[&str] = &[Patient::TABLE];
const PACIENTES_CITAS: &[&str] = &[Patient::TABLE, Appointment::TABLE];
const CITAS_PACIENTES: &[&str] = &[Appointment::TABLE, Patient::TABLE];
const SERVICIOS: &[&str] = &[Service::TABLE];

impl DashboardData {
    pub fn load(conn: &Connection, filter: &AppointmentFilter) -> Self {
        Self {
            status_options: load_section(CITAS, || appointments::status_options(conn)),
            doctor_options: load_section(DOCTORES, || appointments::doctor_options(conn)),
            appointments: load_section(CITAS_JOINED, || {
                appointments::filtered_appointments(conn, filter)
            }),
            status_counts: load_section(CITAS_JOINED, || appointments::status_counts(conn, filter)),
            daily_counts: load_section(CITAS_JOINED, || appointments::daily_counts(conn, filter)),
            hourly_counts: load_section(CITAS_JOINED, || appointments::hourly_counts(conn, filter)),
            top_doctors: load_section(CITAS_JOINED, || appointments::top_doctors(conn, filter)),
            raw_appointments: load_section(CITAS, || Appointment::list_all(conn)),

            doctors: load_section(DOCTORES, || Doctor::list_all(conn)),
            specialty_counts: load_section(DOCTORES, || doctors::specialty_counts(conn)),
            per_doctor: load_section(DOCTORES_CITAS, || doctors::appointments_per_doctor(conn)),

            patients: load_section(PACIENTES, || Patient::list_all(conn)),
            without_appointments: load_section(PACIENTES_CITAS, || {
                patients::patients_without_appointments(conn)
            }),
            birth_years: load_section(PACIENTES, || patients::birth_year_distribution(conn)),
            top_patients: load_section(CITAS_PACIENTES, || patients::top_patients(conn)),

            services: load_section(SERVICIOS, || Service::list_all(conn)),
            service_types: load_section(SERVICIOS, || services::service_type_counts(conn)),
            top_services: load_section(SERVICIOS, || services::top_services_by_cost(conn)),
        }
    }
}

/// Table cell text; NULL renders as an empty cell
fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Escape text for HTML element and attribute content
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the full page
pub fn render_page(data: &DashboardData, filter: &AppointmentFilter, show_detail: bool) -> String {
    let r = Renderer { show_detail };
    let tabs = [
        ("citas", "Citas", r.appointments_tab(data, filter)),
        ("doctores", "Doctores", r.doctors_tab(data)),
        ("pacientes", "Pacientes", r.patients_tab(data)),
        ("servicios", "Servicios", r.services_tab(data)),
    ];

    let mut radios = String::new();
    let mut panels = String::new();
    let mut selectors = String::new();
    for (i, (id, title, body)) in tabs.iter().enumerate() {
        let checked = if i == 0 { " checked" } else { "" };
        radios.push_str(&format!(
            r#"<input type="radio" name="tab" id="tab-{id}"{checked}><label class="tab" for="tab-{id}">{title}</label>"#
        ));
        panels.push_str(&format!(
            r#"<section class="panel" id="panel-{id}"><h2>{title}</h2>{body}</section>"#
        ));
        selectors.push_str(&format!(
            "#tab-{id}:checked ~ #panel-{id}{{display:block}}\n"
        ));
    }

    format!(
        r##"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Dashboard Hospital AMA</title>
<style>
body{{margin:0;padding:24px;font-family:-apple-system,'Segoe UI',Roboto,sans-serif;background:#f7f7f8;color:#1f2328}}
h1{{margin:0 0 16px}}
input[name=tab]{{display:none}}
.tab{{display:inline-block;padding:10px 18px;margin-right:4px;border-radius:8px 8px 0 0;background:#e5e7eb;cursor:pointer}}
input[name=tab]:checked + .tab{{background:#fff;font-weight:600}}
.panel{{display:none;background:#fff;padding:16px 24px;border-radius:0 8px 8px 8px}}
{selectors}.grid{{display:grid;grid-template-columns:repeat(auto-fit,minmax(560px,1fr));gap:16px}}
table{{border-collapse:collapse;width:100%;font-size:.9rem;margin-bottom:16px}}
th,td{{border-bottom:1px solid #e5e7eb;padding:6px 8px;text-align:left}}
.scroll{{max-height:360px;overflow:auto}}
.placeholder{{padding:24px;color:#6b7280;background:#f3f4f6;border-radius:6px;text-align:center}}
.error{{padding:12px;color:#991b1b;background:#fee2e2;border-radius:6px;margin-bottom:12px}}
.info{{padding:12px;color:#1e40af;background:#dbeafe;border-radius:6px}}
.filters{{display:flex;gap:12px;align-items:end;flex-wrap:wrap;margin-bottom:16px}}
.filters label{{display:flex;flex-direction:column;font-size:.85rem}}
.downloads a{{display:inline-block;margin-right:8px;padding:8px 14px;border-radius:6px;background:#2563eb;color:#fff;text-decoration:none}}
footer{{margin-top:16px;color:#6b7280;font-size:.8rem}}
</style>
</head>
<body>
<h1>Dashboard Hospital AMA</h1>
{radios}
{panels}
<footer>{footer}</footer>
</body>
</html>"##,
        footer = escape_html(&BuildInfo::current().label()),
    )
}

struct Renderer {
    show_detail: bool,
}

impl Renderer {
    fn error(&self, err: &super::SectionError) -> String {
        format!(
            r#"<div class="error">{}</div>"#,
            escape_html(&err.message(self.show_detail))
        )
    }

    fn table<T>(&self, section: &Section<Vec<T>>, headers: &[&str], cells: impl Fn(&T) -> Vec<String>) -> String {
        let rows = match section {
            Ok(rows) => rows,
            Err(e) => return self.error(e),
        };
        if rows.is_empty() {
            return placeholder();
        }

        let mut html = String::from(r#"<div class="scroll"><table><thead><tr>"#);
        for header in headers {
            html.push_str(&format!("<th>{}</th>", escape_html(header)));
        }
        html.push_str("</tr></thead><tbody>");
        for row in rows {
            html.push_str("<tr>");
            for cell in cells(row) {
                html.push_str(&format!("<td>{}</td>", escape_html(&cell)));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table></div>");
        html
    }

    fn chart<T>(&self, section: &Section<Vec<T>>, build: impl Fn(&[T]) -> ChartSeries) -> String {
        let rows = match section {
            Ok(rows) => rows,
            Err(e) => return self.error(e),
        };
        let series = build(rows.as_slice());
        let body = match charts::render(&series) {
            ChartView::Svg(svg) => svg,
            ChartView::Placeholder => placeholder(),
            ChartView::Failed(e) => format!(
                r#"<div class="error">Chart '{}' could not be drawn: {}</div>"#,
                escape_html(&series.title),
                escape_html(&e)
            ),
        };
        format!(
            r#"<figure><figcaption>{}</figcaption>{}</figure>"#,
            escape_html(&series.title),
            body
        )
    }

    fn appointments_tab(&self, data: &DashboardData, filter: &AppointmentFilter) -> String {
        let mut html = self.filter_form(data, filter);

        if let Ok(rows) = &data.appointments {
            html.push_str(&format!("<p>{} citas</p>", rows.len()));
        }
        html.push_str(&self.table(
            &data.appointments,
            &["ID", "Fecha", "Hora", "Estado", "Paciente", "Doctor"],
            |a: &AppointmentDetail| {
                vec![
                    a.id.to_string(),
                    cell(&a.fecha),
                    cell(&a.hora),
                    cell(&a.estado),
                    cell(&a.paciente),
                    cell(&a.doctor),
                ]
            },
        ));
        html.push_str(&self.downloads(&data.appointments, filter));

        html.push_str(r#"<div class="grid">"#);
        html.push_str(&self.chart(&data.status_counts, |rows| {
            ChartSeries::from_rows(
                "Citas por estado",
                ChartKind::Pie,
                "Citas",
                rows,
                |r| r.label.clone(),
                |r| r.count as f64,
            )
        }));
        html.push_str(&self.chart(&data.daily_counts, |rows| {
            ChartSeries::from_rows(
                "Citas por día",
                ChartKind::Line,
                "Citas",
                rows,
                |r| r.day.clone(),
                |r| r.count as f64,
            )
        }));
        html.push_str(&self.chart(&data.hourly_counts, |rows| {
            ChartSeries::from_rows(
                "Citas por hora",
                ChartKind::HorizontalBar,
                "Citas",
                rows,
                |r| format!("{:02}:00", r.hour),
                |r| r.count as f64,
            )
        }));
        html.push_str(&self.chart(&data.top_doctors, |rows| {
            ChartSeries::from_rows(
                "Top 5 doctores con más citas",
                ChartKind::Bar,
                "Citas",
                rows,
                |r| r.label.clone(),
                |r| r.count as f64,
            )
        }));
        html.push_str("</div>");

        html.push_str("<h3>Tabla citas</h3>");
        html.push_str(&self.table(
            &data.raw_appointments,
            &["id", "fecha", "hora", "estado", "doctor_id", "paciente_id"],
            |a: &Appointment| {
                vec![
                    a.id.to_string(),
                    cell(&a.fecha),
                    cell(&a.hora),
                    cell(&a.estado),
                    a.doctor_id.map(|id| id.to_string()).unwrap_or_default(),
                    a.paciente_id.map(|id| id.to_string()).unwrap_or_default(),
                ]
            },
        ));
        html
    }

    fn filter_form(&self, data: &DashboardData, filter: &AppointmentFilter) -> String {
        let mut html = String::from(r#"<form class="filters" method="get" action="/">"#);
        html.push_str(&self.select("status", "Estado", &data.status_options, filter.status.as_deref()));
        html.push_str(&self.select("doctor", "Doctor", &data.doctor_options, filter.doctor.as_deref()));

        let date_value = filter
            .date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        html.push_str(&format!(
            r#"<label>Fecha<input type="date" name="date" value="{}"></label>"#,
            date_value
        ));
        html.push_str(r#"<button type="submit">Aplicar</button><a href="/">Limpiar</a></form>"#);
        html
    }

    fn select(&self, name: &str, title: &str, options: &Section<Vec<String>>, selected: Option<&str>) -> String {
        let values = match options {
            Ok(values) => values,
            Err(e) => return self.error(e),
        };
        let mut html = format!(
            r#"<label>{title}<select name="{name}"><option value="">Todos</option>"#
        );
        for value in values {
            let mark = if selected == Some(value.as_str()) { " selected" } else { "" };
            let escaped = escape_html(value);
            html.push_str(&format!(r#"<option value="{escaped}"{mark}>{escaped}</option>"#));
        }
        html.push_str("</select></label>");
        html
    }

    fn downloads(&self, rows: &Section<Vec<AppointmentDetail>>, filter: &AppointmentFilter) -> String {
        match rows {
            Ok(rows) if !rows.is_empty() => {
                let query = filter.to_query_string();
                let suffix = if query.is_empty() { String::new() } else { format!("?{}", query) };
                let links: Vec<String> = [ExportFormat::Csv, ExportFormat::Xlsx]
                    .iter()
                    .map(|format| {
                        format!(
                            r#"<a href="/export/{name}{suffix}" download="{name}">Descargar {label}</a>"#,
                            name = format.file_name(),
                            label = match format {
                                ExportFormat::Csv => "CSV",
                                ExportFormat::Xlsx => "Excel",
                            },
                        )
                    })
                    .collect();
                format!(r#"<p class="downloads">{}</p>"#, links.join(""))
            }
            Ok(_) => format!(r#"<p class="info">{}</p>"#, EMPTY_EXPORT_MESSAGE),
            // The table slot already shows the load error
            Err(_) => String::new(),
        }
    }

    fn doctors_tab(&self, data: &DashboardData) -> String {
        let mut html = self.table(&data.doctors, &["ID", "Nombre", "Especialidad"], |d: &Doctor| {
            vec![d.id.to_string(), cell(&d.nombre), cell(&d.especialidad)]
        });

        html.push_str(r#"<div class="grid">"#);
        html.push_str(&self.chart(&data.specialty_counts, |rows| {
            ChartSeries::from_rows(
                "Doctores por especialidad",
                ChartKind::Pie,
                "Doctores",
                rows,
                |r| r.label.clone(),
                |r| r.count as f64,
            )
        }));
        html.push_str(&self.chart(&data.per_doctor, |rows| {
            ChartSeries::from_rows(
                "Citas por doctor",
                ChartKind::Bar,
                "Citas",
                rows,
                |r| r.nombre.clone().unwrap_or_else(|| MISSING_LABEL.to_string()),
                |r| r.total as f64,
            )
        }));
        html.push_str("</div>");

        html.push_str("<h3>Total de citas por doctor</h3>");
        html.push_str(&self.table(
            &data.per_doctor,
            &["Doctor", "Especialidad", "Citas"],
            |t: &DoctorTotal| vec![cell(&t.nombre), cell(&t.especialidad), t.total.to_string()],
        ));
        html
    }

    fn patients_tab(&self, data: &DashboardData) -> String {
        let patient_cells = |p: &Patient| {
            vec![
                p.id.to_string(),
                cell(&p.nombre),
                cell(&p.fecha_nacimiento),
            ]
        };
        let headers = ["ID", "Nombre", "Fecha de nacimiento"];

        let mut html = self.table(&data.patients, &headers, patient_cells);
        html.push_str("<h3>Pacientes sin citas</h3>");
        html.push_str(&self.table(&data.without_appointments, &headers, patient_cells));

        html.push_str(r#"<div class="grid">"#);
        html.push_str(&self.chart(&data.birth_years, |rows| {
            ChartSeries::from_rows(
                "Pacientes por año de nacimiento",
                ChartKind::Bar,
                "Pacientes",
                rows,
                |r| r.year.to_string(),
                |r| r.count as f64,
            )
        }));
        html.push_str(&self.chart(&data.top_patients, |rows| {
            ChartSeries::from_rows(
                "Top 5 pacientes con más citas",
                ChartKind::Bar,
                "Citas",
                rows,
                |r| r.label.clone(),
                |r| r.count as f64,
            )
        }));
        html.push_str("</div>");
        html
    }

    fn services_tab(&self, data: &DashboardData) -> String {
        let mut html = self.table(
            &data.services,
            &["ID", "Nombre", "Tipo", "Costo"],
            |s: &Service| {
                vec![
                    s.id.to_string(),
                    cell(&s.nombre),
                    cell(&s.tipo),
                    s.costo.map(|c| format!("{:.2}", c)).unwrap_or_default(),
                ]
            },
        );

        html.push_str(r#"<div class="grid">"#);
        html.push_str(&self.chart(&data.service_types, |rows| {
            ChartSeries::from_rows(
                "Servicios por tipo",
                ChartKind::Pie,
                "Servicios",
                rows,
                |r| r.label.clone(),
                |r| r.count as f64,
            )
        }));
        html.push_str(&self.chart(&data.top_services, |rows| {
            ChartSeries::from_rows(
                "Top 10 servicios más costosos",
                ChartKind::Bar,
                "Costo",
                rows,
                |r| r.nombre.clone().unwrap_or_else(|| MISSING_LABEL.to_string()),
                |r| r.costo,
            )
        }));
        html.push_str("</div>");
        html
    }
}

fn placeholder() -> String {
    format!(r#"<div class="placeholder">{}</div>"#, NO_DATA)
}
