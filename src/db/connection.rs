//! Database connection management
//!
//! Read-only SQLite connection pooling.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;

/// Database error types
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Read-only connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
    path: Arc<PathBuf>,
}

impl Database {
    /// Open a read-only pool over an existing database file
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DbError::NotFound(path.to_path_buf()));
        }

        let manager = SqliteConnectionManager::file(path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI)
            .with_init(|conn| {
                conn.execute_batch(
                    "PRAGMA query_only = ON;
                     PRAGMA temp_store = MEMORY;",
                )?;
                Ok(())
            });

        let pool = Pool::builder()
            .max_size(4)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)?;

        Ok(Self {
            pool: Arc::new(pool),
            path: Arc::new(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get a connection from the pool
    pub fn get_conn(&self) -> DbResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Execute a closure with a database connection
    ///
    /// The connection goes back to the pool when the closure returns.
    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        match Database::open_read_only(&path) {
            Err(DbError::NotFound(p)) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected NotFound"),
        }
    }

    #[test]
    fn test_connections_reject_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hospital.db");
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            schema::create_schema(&conn).unwrap();
        }

        let db = Database::open_read_only(&path).unwrap();
        let count: i64 = db
            .with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM citas", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 0);

        let write = db.with_conn(|conn| {
            conn.execute("INSERT INTO doctores (nombre, especialidad) VALUES ('x', 'y')", [])?;
            Ok(())
        });
        assert!(write.is_err());
        assert_eq!(db.path(), path.as_path());
    }
}
