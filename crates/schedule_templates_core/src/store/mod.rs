//! Durable key/value storage for template state.
//!
//! # Responsibility
//! - Define the string-keyed storage contract the template service depends on.
//! - Provide JSON read/write helpers with fail-open read semantics.
//!
//! # Invariants
//! - `read_json` never fails: missing or malformed values read as absent and
//!   are logged at `warn`.
//! - `write_json` surfaces backend failures to the caller.

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key holding the ordered JSON array of custom templates.
pub const CUSTOM_TEMPLATES_KEY: &str = "custom_templates";
/// Key holding the active template id.
pub const ACTIVE_TEMPLATE_KEY: &str = "active_template_id";

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// Database file carries a schema version this binary does not know.
    Schema { found: u32, supported: u32 },
    /// Store location could not be prepared.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Serialize(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Schema { found, supported } => write!(
                f,
                "template store schema version {found} is newer than supported {supported}"
            ),
            Self::Io { path, source } => {
                write!(f, "cannot prepare store location `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize stored value: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Schema { .. } => None,
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Raw string storage keyed by string.
pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> StoreResult<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_raw(key, value)
    }
}

/// Reads and deserializes the JSON value stored under `key`.
///
/// Returns `None` when the key is missing, the backend read fails, or the
/// stored text does not parse as `T`.
pub fn read_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get_raw(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(
                "event=store_read module=store status=error key={} error_code=backend_read_failed error={}",
                key, err
            );
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                "event=store_read module=store status=error key={} error_code=malformed_json bytes={} error={}",
                key,
                raw.len(),
                err
            );
            None
        }
    }
}

/// Serializes `value` as JSON and persists it under `key`.
pub fn write_json<T: Serialize + ?Sized>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set_raw(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::{read_json, write_json, KeyValueStore, MemoryStore};

    #[test]
    fn read_json_returns_written_value() {
        let store = MemoryStore::new();
        write_json(&store, "numbers", &vec![1, 2, 3]).unwrap();
        let value: Option<Vec<u32>> = read_json(&store, "numbers");
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[test]
    fn read_json_treats_missing_and_malformed_as_absent() {
        let store = MemoryStore::new();
        assert_eq!(read_json::<Vec<u32>>(&store, "missing"), None);

        store.set_raw("broken", "{not json").unwrap();
        assert_eq!(read_json::<Vec<u32>>(&store, "broken"), None);
    }

    #[test]
    fn read_json_treats_shape_mismatch_as_absent() {
        let store = MemoryStore::new();
        write_json(&store, "value", "text").unwrap();
        assert_eq!(read_json::<Vec<u32>>(&store, "value"), None);
    }
}
