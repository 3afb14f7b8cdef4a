//! SQLite bootstrap backing the durable template store.
//!
//! # Responsibility
//! - Open file or in-memory connections for `SqliteStore`.
//! - Create the `kv_store` table and stamp its version.
//!
//! # Invariants
//! - `PRAGMA user_version` is 0 (fresh file) or `SCHEMA_VERSION`.
//! - Files stamped with a newer version are refused, never rewritten.

use crate::store::{StoreError, StoreResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Version written to `PRAGMA user_version` once `kv_store` exists.
pub const SCHEMA_VERSION: u32 = 1;

const KV_STORE_SQL: &str = include_str!("kv_store.sql");

/// Opens (or creates) the store database file.
///
/// # Side effects
/// - Creates the parent directory when missing.
/// - Emits `store_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> StoreResult<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| {
            error!(
                "event=store_open module=db status=error mode=file error_code=dir_create_failed error={}",
                source
            );
            StoreError::Io {
                path: parent.to_path_buf(),
                source,
            }
        })?;
    }
    open_with("file", || Connection::open(path))
}

/// Opens an empty in-memory store database.
pub fn open_db_in_memory() -> StoreResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<Connection> {
    let started_at = Instant::now();
    let opened = connect()
        .map_err(StoreError::from)
        .and_then(|conn| ensure_schema(&conn).map(|()| conn));

    match &opened {
        Ok(_) => info!(
            "event=store_open module=db status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=store_open module=db status=error mode={} duration_ms={} error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    opened
}

fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    let found = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    match found {
        SCHEMA_VERSION => Ok(()),
        0 => {
            conn.execute_batch(&format!(
                "BEGIN;\n{KV_STORE_SQL}\nPRAGMA user_version = {SCHEMA_VERSION};\nCOMMIT;"
            ))?;
            Ok(())
        }
        found => Err(StoreError::Schema {
            found,
            supported: SCHEMA_VERSION,
        }),
    }
}
