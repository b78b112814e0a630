//! Durable string key/value store backing the session.
//!
//! A single JSON object in the config directory. The session manager only
//! needs get/set/delete; it never cares that this is a file.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config;

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Opens the store at its default location (~/.config/reddish/session.json).
    pub fn open() -> Result<Self> {
        config::ensure_config_dir()?;
        Ok(Self {
            path: config::config_dir()?.join("session.json"),
        })
    }

    /// Opens the store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session store: {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session store: {}", self.path.display()))
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session store: {}", self.path.display()))?;

        // The store holds a bearer token; keep it private on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, permissions)?;
        }

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        let mut values = self.read_all().unwrap_or_default();
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_get_set_delete_roundtrip() {
        let dir = tempdir().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));

        assert!(store.get("username").unwrap().is_none());

        store.set("username", "bob").unwrap();
        store.set("access_token", "tok").unwrap();
        assert_eq!(store.get("username").unwrap().as_deref(), Some("bob"));

        store.delete("username").unwrap();
        assert!(store.get("username").unwrap().is_none());
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("tok"));
    }

    #[test]
    fn test_set_overwrites() {
        let dir = tempdir().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));

        store.set("oauth_state", "first").unwrap();
        store.set("oauth_state", "second").unwrap();
        assert_eq!(store.get("oauth_state").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let dir = tempdir().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));
        store.delete("nope").unwrap();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        SessionStore::with_path(path.clone())
            .set("session", "true")
            .unwrap();

        let reopened = SessionStore::with_path(path);
        assert_eq!(reopened.get("session").unwrap().as_deref(), Some("true"));
    }
}
