use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "glean-chat")]
#[command(about = "Chat client for a Glean-style backend.", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Interactive chat session (default)
    Chat,

    /// Manage the backend URL and API token
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Development proxy that forwards to the backend and adds CORS headers
    Proxy {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Backend the proxy forwards to
        #[arg(short, long, default_value = "https://support-lab-be.glean.com")]
        target: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Store the API token
    SetToken { token: String },
    /// Store the backend URL
    SetUrl { url: String },
    /// Print the saved configuration (token masked)
    Show,
    /// Remove the saved token and backend URL
    Clear,
}
