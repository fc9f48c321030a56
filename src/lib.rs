//! Hospital Dashboard Library
//!
//! Read-only analytics over a hospital SQLite database: appointment
//! filtering, aggregate reports, charts and exports.

pub mod build_info;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod export;
pub mod filter;
pub mod mcp;
pub mod models;
pub mod reports;
