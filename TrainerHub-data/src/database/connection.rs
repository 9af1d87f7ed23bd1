//! SQLite pool backing the persistent key-value store
//!
//! All records live in one `kv_store` table. The pool is opened once per process and
//! shared by every store built on top of it.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;

static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

pub type DatabasePool = Arc<r2d2::Pool<SqliteConnectionManager>>;

/// Backend behind the key-value store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// Single SQLite file
    Sqlite,
    /// Process memory; nothing survives a restart
    Memory,
}

impl FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            "memory" | "in-memory" => Ok(DatabaseType::Memory),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    #[error("Unsupported database type: {0} (expected sqlite or memory)")]
    UnsupportedDatabaseType(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// The directory for the database file could not be created
    #[error("Database path error: {0}")]
    Path(String),
}

/// Storage settings, read from `DB_TYPE`, `DB_SQLITE_PATH` and `DB_POOL_SIZE`
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub db_type: DatabaseType,
    pub sqlite_path: String,
    pub pool_size: u32,
    /// Seconds to wait for a free connection
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: "./data/trainer_hub.db".to_string(),
            pool_size: 5,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, DatabaseError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the storage settings from any variable source
    ///
    /// Unparsable or zero sizes fall back to the defaults; an unknown `DB_TYPE` is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DatabaseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let number = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u64>().ok()).filter(|n| *n > 0);

        let db_type = match lookup("DB_TYPE") {
            Some(value) if !value.trim().is_empty() => value.trim().parse()?,
            _ => defaults.db_type,
        };

        let pool_size = match number("DB_POOL_SIZE").map(u32::try_from) {
            Some(Ok(size)) => size,
            Some(Err(_)) | None => defaults.pool_size,
        };

        Ok(Self {
            db_type,
            sqlite_path: lookup("DB_SQLITE_PATH")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.sqlite_path),
            pool_size,
            timeout_seconds: number("DB_TIMEOUT_SECONDS").unwrap_or(defaults.timeout_seconds),
        })
    }
}

/// Open the process-wide pool and bring the schema up to date
pub fn initialize_database_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    info!("Opening key-value database at {}", config.sqlite_path);
    let pool = build_sqlite_pool(config)?;

    DB_POOL
        .set(pool.clone())
        .map_err(|_| DatabaseError::PoolAlreadyInitialized)?;

    Ok(pool)
}

pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get().cloned().ok_or(DatabaseError::PoolNotInitialized)
}

/// Build a migrated pool without registering it process-wide
pub fn build_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    if let Some(parent) = Path::new(&config.sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory: {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| DatabaseError::Path(e.to_string()))?;
        }
    }

    let manager = SqliteConnectionManager::file(&config.sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    let pool = r2d2::Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)
        .map_err(|e| {
            error!("Failed to open SQLite pool at {}: {}", config.sqlite_path, e);
            DatabaseError::Pool(e)
        })?;

    run_sqlite_migrations(&*pool.get()?)?;

    info!("SQLite pool ready ({} connections max)", config.pool_size);
    Ok(Arc::new(pool))
}

/// Pool over a private in-memory database
///
/// Each in-memory connection is a separate database, so the pool holds exactly one.
pub fn build_in_memory_sqlite_pool() -> Result<DatabasePool, DatabaseError> {
    warn!("Using in-memory SQLite database, data will not survive a restart");

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .build(SqliteConnectionManager::memory())?;

    run_sqlite_migrations(&*pool.get()?)?;

    Ok(Arc::new(pool))
}

pub fn check_database_health(pool: &DatabasePool) -> Result<(), DatabaseError> {
    let conn = pool.get()?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

/// Location and pool usage of the process-wide database, if one is open
pub fn get_connection_info() -> Option<String> {
    let pool = DB_POOL.get()?;

    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to get SQLite connection: {}", e);
            return Some(format!("SQLite connection error: {}", e));
        }
    };

    let location = match conn.query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2)) {
        Ok(path) if path.is_empty() => "in-memory SQLite".to_string(),
        Ok(path) => format!("SQLite at {}", path),
        Err(_) => "SQLite (path unknown)".to_string(),
    };

    let state = pool.state();
    Some(format!(
        "{}, {} connections ({} idle)",
        location, state.connections, state.idle_connections
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_type_from_str() {
        assert_eq!("sqlite".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
        assert_eq!("SQLite".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
        assert_eq!("in-memory".parse::<DatabaseType>().unwrap(), DatabaseType::Memory);
        assert!(matches!(
            "postgres".parse::<DatabaseType>(),
            Err(DatabaseError::UnsupportedDatabaseType(name)) if name == "postgres"
        ));
    }

    #[test]
    fn test_config_from_lookup() {
        let vars = [("DB_TYPE", "memory"), ("DB_POOL_SIZE", "0"), ("DB_SQLITE_PATH", "/tmp/hub.db")];
        let config = DatabaseConfig::from_lookup(|name| {
            vars.iter().find(|(k, _)| *k == name).map(|(_, v)| v.to_string())
        })
        .unwrap();

        assert_eq!(config.db_type, DatabaseType::Memory);
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.sqlite_path, "/tmp/hub.db");
        assert_eq!(config.timeout_seconds, 30);

        assert!(DatabaseConfig::from_lookup(|name| (name == "DB_TYPE").then(|| "mysql".to_string())).is_err());
    }

    #[test]
    fn test_build_sqlite_pool_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/hub.db");
        let config = DatabaseConfig {
            sqlite_path: path.to_string_lossy().to_string(),
            ..DatabaseConfig::default()
        };

        let pool = build_sqlite_pool(&config).unwrap();
        assert!(path.exists());
        assert!(check_database_health(&pool).is_ok());
    }

    #[test]
    fn test_in_memory_pool_is_healthy() {
        let pool = build_in_memory_sqlite_pool().unwrap();
        assert!(check_database_health(&pool).is_ok());
    }
}
