//! Hospital Dashboard MCP server
//!
//! Serves the dashboard aggregates as MCP tools over stdio.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use hospital_dashboard::build_info;
use hospital_dashboard::config::DashboardConfig;
use hospital_dashboard::db::Database;
use hospital_dashboard::mcp::DashboardMcpService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("hospital_dashboard=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    build_info::print_startup_banner("MCP server on stdio");

    let config = DashboardConfig::from_env()?;
    eprintln!("Database path: {}", config.database_path.display());

    let database = Database::open_read_only(&config.database_path)?;
    let service = DashboardMcpService::new(database);

    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
