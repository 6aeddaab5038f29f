//! Shared helpers for tests.

use std::sync::Mutex;

use crate::config::{CredentialStore, DEFAULT_BACKEND_URL};
use crate::error::Result;

/// In-memory credential store for tests; no filesystem involved.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    token: Mutex<Option<String>>,
    backend_url: Mutex<Option<String>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend_url(url: impl Into<String>) -> Self {
        let store = Self::default();
        *store.backend_url.lock().unwrap() = Some(url.into());
        store
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn set_token(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear_token(&self) -> Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }

    fn backend_url(&self) -> String {
        self.backend_url
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    fn set_backend_url(&self, url: &str) -> Result<()> {
        *self.backend_url.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    fn clear_backend_url(&self) -> Result<()> {
        *self.backend_url.lock().unwrap() = None;
        Ok(())
    }
}
