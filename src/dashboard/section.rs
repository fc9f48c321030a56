//! Per-section error boundaries
//!
//! Each table or chart loads on its own. A failure is logged, turned into
//! a message naming the table, and never reaches sibling sections.

use crate::db::DbResult;

/// A section's data, or the reason it couldn't load
pub type Section<T> = Result<T, SectionError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionError {
    /// Table the failure is attributed to
    pub table: &'static str,
    /// Underlying database diagnostic
    pub detail: String,
}

impl SectionError {
    /// Attribute a failure to one of the tables a section reads
    ///
    /// A "no such table" diagnostic names the culprit directly; anything
    /// else is charged to the section's primary (first) table.
    fn new(tables: &'static [&'static str], detail: String) -> Self {
        let table = tables
            .iter()
            .copied()
            .find(|t| mentions_missing(&detail, t))
            .or_else(|| tables.first().copied())
            .unwrap_or_default();
        Self { table, detail }
    }

    /// User-facing message, with the diagnostic appended when asked
    pub fn message(&self, show_detail: bool) -> String {
        let base = format!(
            "Error loading table '{}'. Check that it exists in the database.",
            self.table
        );
        if show_detail {
            format!("{} ({})", base, self.detail)
        } else {
            base
        }
    }
}

fn mentions_missing(detail: &str, table: &str) -> bool {
    let marker = format!("no such table: {}", table);
    detail.match_indices(&marker).any(|(at, _)| {
        // "citas" must not match "citas_archivo"
        let rest = &detail[at + marker.len()..];
        !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_')
    })
}

/// Run one section's query inside its own boundary
///
/// `tables` lists every table the query reads, primary table first.
pub fn load_section<T, F>(tables: &'static [&'static str], load: F) -> Section<T>
where
    F: FnOnce() -> DbResult<T>,
{
    load().map_err(|e| {
        let err = SectionError::new(tables, e.to_string());
        tracing::warn!(table = err.table, error = %err.detail, "dashboard section failed to load");
        err
    })
}
