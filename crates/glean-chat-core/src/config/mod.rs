//! Credential and backend configuration.
//!
//! The transport reads these at call time; a missing token is not an error,
//! the request simply goes out unauthenticated.

use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Used when no backend URL has been configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

pub trait CredentialStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str) -> Result<()>;
    fn clear_token(&self) -> Result<()>;

    /// Falls back to [`DEFAULT_BACKEND_URL`] when unset.
    fn backend_url(&self) -> String;
    fn set_backend_url(&self, url: &str) -> Result<()>;
    fn clear_backend_url(&self) -> Result<()>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CredentialData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    backend_url: Option<String>,
}

/// TOML-file-backed credential store, written through on every change.
pub struct FileCredentialStore {
    path: PathBuf,
    data: Mutex<CredentialData>,
}

impl FileCredentialStore {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            Error::Configuration("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("glean-chat").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Ok(Self::load_from(Self::config_path()?))
    }

    /// Load from an explicit path; a missing or unparseable file yields
    /// defaults.
    pub fn load_from(path: PathBuf) -> Self {
        let data = if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(data) => data,
                    Err(err) => {
                        tracing::warn!(
                            "Failed to parse config file at {:?}: {}. Using defaults.",
                            path,
                            err
                        );
                        CredentialData::default()
                    }
                },
                Err(err) => {
                    tracing::warn!("Failed to read config file at {:?}: {}. Using defaults.", path, err);
                    CredentialData::default()
                }
            }
        } else {
            CredentialData::default()
        };

        Self {
            path,
            data: Mutex::new(data),
        }
    }

    fn save(&self, data: &CredentialData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(data)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn mutate(&self, f: impl FnOnce(&mut CredentialData)) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        f(&mut data);
        self.save(&data)
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self) -> Option<String> {
        self.data.lock().unwrap().token.clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.mutate(|data| data.token = Some(token.to_string()))
    }

    fn clear_token(&self) -> Result<()> {
        self.mutate(|data| data.token = None)
    }

    fn backend_url(&self) -> String {
        self.data
            .lock()
            .unwrap()
            .backend_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    fn set_backend_url(&self, url: &str) -> Result<()> {
        self.mutate(|data| data.backend_url = Some(url.to_string()))
    }

    fn clear_backend_url(&self) -> Result<()> {
        self.mutate(|data| data.backend_url = None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::load_from(dir.path().join("config.toml"));
        assert_eq!(store.token(), None);
        assert_eq!(store.backend_url(), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn values_round_trip_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let store = FileCredentialStore::load_from(path.clone());
        store.set_token("secret-token").unwrap();
        store.set_backend_url("http://localhost:8080").unwrap();

        let reloaded = FileCredentialStore::load_from(path);
        assert_eq!(reloaded.token().as_deref(), Some("secret-token"));
        assert_eq!(reloaded.backend_url(), "http://localhost:8080");
    }

    #[test]
    fn clearing_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let store = FileCredentialStore::load_from(path.clone());
        store.set_token("secret").unwrap();
        store.set_backend_url("http://example.com").unwrap();
        store.clear_token().unwrap();
        store.clear_backend_url().unwrap();

        let reloaded = FileCredentialStore::load_from(path);
        assert_eq!(reloaded.token(), None);
        assert_eq!(reloaded.backend_url(), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn unparseable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let store = FileCredentialStore::load_from(path);
        assert_eq!(store.token(), None);
        assert_eq!(store.backend_url(), DEFAULT_BACKEND_URL);
    }
}
