//! Option storage for indexping
//!
//! The pipeline keeps a handful of small values between events: the active
//! key, the pregenerated key, the key file flag and the last delivery error.
//! Hosts provide storage through the [`OptionStore`] trait; two stores ship
//! with the crate:
//! - [`MemoryStore`] for tests and embedding
//! - [`SqliteStore`] backed by a local SQLite database

pub mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// Option holding the key sent with every submission
pub const ACTIVE_KEY: &str = "indexnow_api_key";

/// Option holding the key generated at provisioning time (write-once)
pub const PREGENERATED_KEY: &str = "indexnow_pregenerated_key";

/// Option holding the key file flag (`"1"` or `"0"`)
pub const USE_KEY_FILE: &str = "indexnow_use_key_file";

/// Option holding the JSON-encoded last error record
pub const LAST_ERROR: &str = "indexnow_last_error";

/// Key/value option storage supplied by the host environment
///
/// Each call is an independent read-modify-write; concurrent writers race and
/// the last one wins.
pub trait OptionStore: Send + Sync {
    /// Read an option, `None` when it was never set
    fn get(&self, name: &str) -> Result<Option<String>>;

    /// Create or overwrite an option
    fn set(&self, name: &str, value: &str) -> Result<()>;

    /// Remove an option; removing a missing option is not an error
    fn delete(&self, name: &str) -> Result<()>;

    /// Read an option, falling back to `default` when it was never set
    fn get_or(&self, name: &str, default: &str) -> Result<String> {
        Ok(self.get(name)?.unwrap_or_else(|| default.to_string()))
    }

    /// Read a boolean option stored as `"1"`/`"0"`
    fn get_flag(&self, name: &str) -> Result<bool> {
        Ok(self
            .get(name)?
            .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes" | "on")))
    }

    /// Write a boolean option as `"1"`/`"0"`
    fn set_flag(&self, name: &str, value: bool) -> Result<()> {
        self.set(name, if value { "1" } else { "0" })
    }
}

/// In-memory option store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of options currently set
    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    /// Whether no option is set
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OptionStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(name).cloned())
    }

    fn set(&self, name: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.values.lock().unwrap().remove(name);
        Ok(())
    }
}
