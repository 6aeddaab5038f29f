use std::sync::Arc;

use clap::Parser;

mod cli;
mod commands;
mod error;

use cli::{Cli, Commands};
use glean_chat_core::api::ChatClient;
use glean_chat_core::chat::{ChatController, MessageStore};
use glean_chat_core::config::FileCredentialStore;

#[tokio::main]
async fn main() -> Result<(), error::Error> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glean_chat=info".into()),
        )
        .init();

    let command = cli.command.unwrap_or(Commands::Chat);
    match command {
        Commands::Chat => {
            let credentials = Arc::new(FileCredentialStore::load()?);
            let store = Arc::new(MessageStore::new());
            let client = ChatClient::new(credentials);
            let controller = ChatController::new(client, Arc::clone(&store));
            commands::chat::run(store, controller).await?;
        }
        Commands::Config { command } => commands::config::run(&command)?,
        Commands::Proxy { port, target } => commands::proxy::run(port, target).await?,
    }

    Ok(())
}
