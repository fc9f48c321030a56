//! Dashboard web surface
//!
//! Server-rendered tabbed page, export downloads and health check.

pub mod page;
pub mod section;
pub mod server;

pub use page::DashboardData;
pub use section::{load_section, Section, SectionError};
pub use server::{router, AppState, DashboardError};
