use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "userdesk")]
#[command(about = "List, create, and delete users on a remote user service")]
#[command(version)]
pub struct Cli {
    /// Base URL of the user service (overrides USERDESK_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Run a single command and exit; without one the interactive UI starts
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print all users
    List,

    /// Create a user
    Add {
        /// Email address of the new user
        #[arg(short, long)]
        email: String,

        /// Optional display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Delete a user by id
    Delete {
        /// Id of the user to delete
        #[arg(long)]
        id: String,
    },
}
