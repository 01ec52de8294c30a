use crate::errors::ConfigError;
use crate::key::{derive_key, StorageKey};
use crate::session::SEED_USERS;
use reqwest::Url;
use std::env;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_URL: &str = "http://127.0.0.1:8000/";

pub fn resolve_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT)
}

pub fn resolve_store_url() -> Result<Url, ConfigError> {
    let value = env::var("STORE_URL").unwrap_or_else(|_| DEFAULT_STORE_URL.to_string());
    Url::parse(&value).map_err(|err| ConfigError::InvalidStoreUrl {
        reason: err.to_string(),
        value,
    })
}

/// Seed list from `TRACKER_USERS` (comma separated), or the built-in one.
pub fn resolve_seed_users() -> Vec<String> {
    match env::var("TRACKER_USERS") {
        Ok(value) => parse_user_list(&value),
        Err(_) => SEED_USERS.iter().map(|name| name.to_string()).collect(),
    }
}

/// Splits a comma-separated user list. Names that map to a storage key
/// already taken by an earlier entry are dropped, so two users never share
/// a document.
pub fn parse_user_list(value: &str) -> Vec<String> {
    let mut users: Vec<String> = Vec::new();
    let mut keys: Vec<StorageKey> = Vec::new();
    for name in value.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let key = derive_key(name);
        if keys.contains(&key) {
            warn!("ignoring seed user {name:?}: key {key} is already taken");
            continue;
        }
        keys.push(key);
        users.push(name.to_string());
    }
    users
}
