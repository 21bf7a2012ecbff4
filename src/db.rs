// src/db.rs

pub mod schema;

pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod workstation_repo;
pub use workstation_repo::WorkstationRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod product_code_repo;
pub use product_code_repo::ProductCodeRepository;
pub mod tracking_repo;
pub use tracking_repo::TrackingRepository;

use std::{path::Path, sync::Arc, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    ConnectOptions, Connection, SqliteConnection, SqlitePool,
};
use tokio::sync::Mutex;

/// The one connection to the main database. Every read and write of
/// employees, workstations, tasks and product codes holds this lock.
pub type MainDb = Arc<Mutex<SqliteConnection>>;

/// Connection options shared by every handle on one database file.
pub fn connect_options(path: &Path, busy_timeout: Duration) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(busy_timeout)
}

pub async fn open_connection(options: &SqliteConnectOptions) -> Result<SqliteConnection, sqlx::Error> {
    let conn = options.connect().await?;
    Ok(conn)
}

/// Pool used for reads only. Writes to these files go through the single
/// admin connection or the tracking worker.
pub async fn reader_pool(
    options: SqliteConnectOptions,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}

/// Closes a connection, logging instead of failing; used after a batch or
/// maintenance run when the work itself already succeeded.
pub async fn close_quietly(conn: SqliteConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close database connection: {}", e);
    }
}
