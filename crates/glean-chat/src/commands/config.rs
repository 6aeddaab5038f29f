//! Configuration management: backend URL and API token.

use glean_chat_core::config::{CredentialStore, FileCredentialStore};

use crate::cli::ConfigCommands;
use crate::error::Error;

pub fn run(command: &ConfigCommands) -> Result<(), Error> {
    let store = FileCredentialStore::load()?;
    match command {
        ConfigCommands::SetToken { token } => {
            store.set_token(token)?;
            println!("Token saved");
        }
        ConfigCommands::SetUrl { url } => {
            store.set_backend_url(url)?;
            println!("Backend URL saved");
        }
        ConfigCommands::Show => {
            println!("backend url: {}", store.backend_url());
            match store.token() {
                Some(token) => println!("token: {}", mask(&token)),
                None => println!("token: (not set)"),
            }
        }
        ConfigCommands::Clear => {
            store.clear_token()?;
            store.clear_backend_url()?;
            println!("Configuration cleared");
        }
    }
    Ok(())
}

/// Keep only the last few characters visible.
fn mask(token: &str) -> String {
    let visible: String = token
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{visible}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_keeps_only_a_short_suffix() {
        assert_eq!(mask("glean-api-token-1234"), "****1234");
        assert_eq!(mask("ab"), "****ab");
    }
}
