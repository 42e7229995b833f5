use clap::{Parser, Subcommand};

/// Apptoken Verifier — exchange app tokens for auth tokens
#[derive(Parser)]
#[command(name = "apptokenverifier", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the verifier server
    Serve {
        /// Port to bind (defaults to APPTOKEN_PORT or 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage stored app tokens
    #[command(name = "apptoken")]
    AppToken {
        #[command(subcommand)]
        command: AppTokenCommands,
    },
}

#[derive(Subcommand)]
pub enum AppTokenCommands {
    /// Create a new app token for a user
    Add {
        #[arg(long)]
        user_id: String,
        /// Free text reminder of where the token is used
        #[arg(long)]
        note: Option<String>,
    },
    /// List a user's app tokens (metadata only)
    List {
        #[arg(long)]
        user_id: String,
    },
    /// Remove an app token
    Remove {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        token_id: String,
    },
}
