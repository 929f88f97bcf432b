//! Identification key provisioning
//!
//! IndexNow proves site ownership with a key that is sent in every payload and
//! optionally published at `{site-root}/{key}.txt`. A key is generated once and
//! kept as the "pregenerated" key; the active key starts out as a copy of it and
//! may later be replaced by the operator.

use crate::error::{Error, Result};
use crate::store::{OptionStore, ACTIVE_KEY, PREGENERATED_KEY};

/// Minimum key length accepted by IndexNow
pub const MIN_KEY_LEN: usize = 8;

/// Maximum key length accepted by IndexNow
pub const MAX_KEY_LEN: usize = 128;

/// Generate a fresh key: a v4 UUID rendered as 32 lowercase hex characters
pub fn generate_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Ensure a key exists, returning the active key
///
/// Generates the pregenerated key if missing, then fills the active key from it
/// when the active key is empty. An operator-supplied key is never replaced, so
/// calling this repeatedly is safe.
pub fn provision(store: &dyn OptionStore) -> Result<String> {
    let pregenerated = match store.get(PREGENERATED_KEY)? {
        Some(key) if !key.trim().is_empty() => key,
        _ => {
            let key = generate_key();
            store.set(PREGENERATED_KEY, &key)?;
            tracing::info!("Generated IndexNow key");
            key
        }
    };

    match store.get(ACTIVE_KEY)? {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => {
            store.set(ACTIVE_KEY, &pregenerated)?;
            tracing::debug!("Activated pregenerated IndexNow key");
            Ok(pregenerated)
        }
    }
}

/// Returns the trimmed active key, or `None` when no usable key is configured
pub fn active_key(store: &dyn OptionStore) -> Result<Option<String>> {
    Ok(store
        .get(ACTIVE_KEY)?
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty()))
}

/// Check a key against the IndexNow format: 8-128 characters of `a-z`, `A-Z`, `0-9` or `-`
pub fn validate_key(key: &str) -> Result<()> {
    let len = key.chars().count();
    if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&len) {
        return Err(Error::InvalidKey(format!(
            "key must be between {} and {} characters, got {}",
            MIN_KEY_LEN, MAX_KEY_LEN, len
        )));
    }
    if let Some(bad) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(Error::InvalidKey(format!(
            "key may only contain letters, digits and '-', found {:?}",
            bad
        )));
    }
    Ok(())
}

/// Replace the active key with an operator-supplied one
pub fn set_key(store: &dyn OptionStore, key: &str) -> Result<()> {
    let key = key.trim();
    validate_key(key)?;
    store.set(ACTIVE_KEY, key)?;
    tracing::info!("Active IndexNow key replaced by operator");
    Ok(())
}

/// Generate a fresh key and make it the active key
///
/// The pregenerated key is write-once and keeps its original value.
pub fn regenerate(store: &dyn OptionStore) -> Result<String> {
    let key = generate_key();
    store.set(ACTIVE_KEY, &key)?;
    tracing::info!("Regenerated IndexNow key");
    Ok(key)
}
