//! MCP server module
//!
//! Exposes the dashboard aggregates as MCP tools.

mod server;

pub use server::DashboardMcpService;
