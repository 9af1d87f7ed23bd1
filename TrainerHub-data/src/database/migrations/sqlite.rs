use rusqlite::Connection;
use tracing::{debug, info};

use crate::database::DatabaseError;

/// Ordered schema steps, applied once each and tracked through `PRAGMA user_version`
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "create kv_store table",
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
    ),
    (
        "create kv_store updated_at index",
        "CREATE INDEX IF NOT EXISTS idx_kv_store_updated_at ON kv_store (updated_at DESC)",
    ),
];

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current: usize = conn
        .query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))
        .map(|v| v.max(0) as usize)?;

    if current >= MIGRATIONS.len() {
        debug!("SQLite schema is up to date (version {})", current);
        return Ok(());
    }

    info!("Running SQLite migrations from version {}", current);

    for (index, (name, sql)) in MIGRATIONS.iter().enumerate().skip(current) {
        info!("Applying migration {}: {}", index + 1, name);
        conn.execute_batch(sql)
            .map_err(|e| DatabaseError::Migration(format!("{}: {}", name, e)))?;
        conn.pragma_update(None, "user_version", (index + 1) as i64)?;
    }

    info!("SQLite migrations completed successfully");
    Ok(())
}
