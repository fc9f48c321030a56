//! Hospital Dashboard
//!
//! Serves the tabbed analytics page over HTTP.

use tracing_subscriber::EnvFilter;

use hospital_dashboard::build_info;
use hospital_dashboard::config::DashboardConfig;
use hospital_dashboard::dashboard::{router, AppState};
use hospital_dashboard::db::Database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("hospital_dashboard=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner("HTTP dashboard");

    let config = DashboardConfig::from_env()?;
    eprintln!("Database path: {}", config.database_path.display());

    // A missing file is fatal; missing tables only blank their sections
    let database = Database::open_read_only(&config.database_path)?;

    let state = AppState {
        database,
        show_error_detail: config.show_error_detail,
    };

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "dashboard listening");
    eprintln!("Open http://{}/", config.listen_addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}
