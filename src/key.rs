use serde::Serialize;
use std::fmt;

/// Normalized identifier addressing a user's workout and notes documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trims and lowercases `name`, then collapses every run of characters
/// outside `[a-z0-9]` into a single `_`.
///
/// Distinct names can map to the same key ("Ana Maria" and "ana-maria").
pub fn derive_key(name: &str) -> StorageKey {
    let lowered = name.trim().to_lowercase();
    let mut key = String::with_capacity(lowered.len());
    let mut in_run = false;
    for ch in lowered.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            key.push(ch);
            in_run = false;
        } else if !in_run {
            key.push('_');
            in_run = true;
        }
    }
    StorageKey(key)
}
