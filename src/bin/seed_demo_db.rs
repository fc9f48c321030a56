//! Utility to create a demonstration hospital database
//!
//! Writes the schema and a small data set to the configured database path.
//! Refuses to touch a database that already has appointments.

use rusqlite::Connection;

use hospital_dashboard::config::DashboardConfig;
use hospital_dashboard::db::schema::{create_schema, insert_demo_data};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DashboardConfig::from_env()?;
    let db_path = config.database_path;
    println!("Database path: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(&db_path)?;
    create_schema(&conn)?;

    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM citas", [], |row| row.get(0))?;
    if existing > 0 {
        println!("citas already has {} rows; leaving the database unchanged", existing);
        return Ok(());
    }

    let inserted = insert_demo_data(&conn)?;
    println!("Inserted {} demo rows", inserted);

    Ok(())
}
