use std::path::Path;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Open the connection pool and sync the catalog schema.
///
/// The pool is owned by whoever holds the returned handle; repositories clone
/// it and every query acquires and releases its own connection.
pub async fn init_db(db_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    ensure_sqlite_parent(db_url)?;

    let mut opt = ConnectOptions::new(db_url.to_owned());

    // Set connection pool options
    opt.max_connections(max_connections.max(1))
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("sthala_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}

/// SQLite will not create missing parent directories of a database file.
fn ensure_sqlite_parent(db_url: &str) -> Result<(), DbErr> {
    let Some(rest) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| DbErr::Custom(format!("Failed to create database directory: {e}")))?;
    }
    Ok(())
}
