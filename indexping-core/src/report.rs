//! One-shot error reporting
//!
//! Only the most recent delivery failure is kept. It is shown to an operator
//! once and deleted as it is read.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{OptionStore, LAST_ERROR};

/// The most recent delivery failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    pub message: String,
    /// Unix timestamp in seconds
    pub timestamp: i64,
}

impl LastError {
    /// When the failure was recorded
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.timestamp, 0).single()
    }
}

/// Reads and writes the last error record in an option store
pub struct ErrorReporter<'a> {
    store: &'a dyn OptionStore,
}

impl<'a> ErrorReporter<'a> {
    pub fn new(store: &'a dyn OptionStore) -> Self {
        Self { store }
    }

    /// Store `message` as the last error, replacing any unread record
    pub fn record(&self, message: &str) -> Result<()> {
        let record = LastError {
            message: message.to_string(),
            timestamp: Utc::now().timestamp(),
        };
        self.store.set(LAST_ERROR, &serde_json::to_string(&record)?)?;
        tracing::debug!(message, "Recorded last error");
        Ok(())
    }

    /// Take the last error, deleting it so it is shown at most once
    ///
    /// A record that no longer parses is deleted and treated as absent.
    pub fn consume(&self) -> Result<Option<LastError>> {
        let Some(raw) = self.store.get(LAST_ERROR)? else {
            return Ok(None);
        };
        self.store.delete(LAST_ERROR)?;

        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable last error record");
                Ok(None)
            }
        }
    }

    /// Look at the last error without deleting it
    pub fn peek(&self) -> Result<Option<LastError>> {
        Ok(self
            .store
            .get(LAST_ERROR)?
            .and_then(|raw| serde_json::from_str(&raw).ok()))
    }
}
