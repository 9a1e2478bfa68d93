//! FileDesk Preference Store
//!
//! Provides:
//! - SQLite key-value table for persisted UI preferences
//! - In-memory backend for tests and degraded startup
//! - Typed access to the selected-file and pagination preferences

mod kv;
mod pool;
mod prefs;
mod schema;

pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use pool::{init_pool, DbPool};
pub use prefs::{PageSize, PaginationPreference, PrefKey, PreferenceStore};
pub use schema::migrate;

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Get the database directory
pub fn db_dir() -> PathBuf {
    ProjectDirs::from("com", "FileDesk", "FileDesk")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Open the preference store in the default data directory
pub fn init() -> Result<PreferenceStore> {
    let dir = db_dir();
    std::fs::create_dir_all(&dir)?;
    open(&dir.join("preferences.db"))
}

/// Open (and migrate) a preference store backed by the SQLite file at `path`
pub fn open(path: &Path) -> Result<PreferenceStore> {
    let pool = init_pool(path)?;
    migrate(&pool)?;

    tracing::info!("Preference store opened at {:?}", path);
    Ok(PreferenceStore::new(Arc::new(SqliteStore::new(pool))))
}
