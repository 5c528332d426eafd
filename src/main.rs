//! userdesk binary entry point

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use userdesk::{
    api::{HttpUsersApi, UsersApi},
    cli::{Cli, Commands},
    config::Config,
    models::NewUser,
    users_tui::App,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env()?.with_api_url(cli.api_url.clone());
    config.validate()?;

    init_logging(&config, cli.command.is_none());
    info!("Using user service at {}", config.api_url);

    let api = HttpUsersApi::new(&config)?;

    match cli.command {
        Some(command) => handle_cli_command(command, &api).await,
        None => run_tui(config, Arc::new(api)).await,
    }
}

/// Log to a file always; also to stderr when no TUI owns the terminal
fn init_logging(config: &Config, interactive: bool) {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("userdesk=info"))
    };

    let file_appender = tracing_appender::rolling::never(&config.log_dir, "userdesk.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(filter());

    let stderr_layer = (!interactive).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter())
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();
}

/// Handle CLI mode commands - print output and exit
async fn handle_cli_command(command: Commands, api: &HttpUsersApi) -> Result<()> {
    match command {
        Commands::List => match api.fetch_users().await {
            Ok(users) => {
                if users.is_empty() {
                    println!("No users found");
                } else {
                    println!("{:<38} {:<40} {:<20}", "Id", "Email", "Name");
                    println!("{}", "-".repeat(98));
                    for user in &users {
                        println!(
                            "{:<38} {:<40} {:<20}",
                            user.id,
                            user.email,
                            user.name.as_deref().unwrap_or("")
                        );
                    }
                    println!();
                    println!("Total: {} users", users.len());
                }
            }
            Err(e) => {
                error!("Listing users failed: {}", e);
                eprintln!("Failed to list users: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Add { email, name } => {
            let payload = NewUser::new(email).with_name(name);
            let id = payload.id.clone();
            let email = payload.email.clone();
            match api.create_user(payload).await {
                Ok(()) => println!("Created user {} <{}>", id, email),
                Err(e) => {
                    error!("Creating user <{}> failed: {}", email, e);
                    eprintln!("Failed to create user <{}>: {}", email, e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Delete { id } => match api.delete_user(&id).await {
            Ok(()) => println!("Deleted user {}", id),
            Err(e) => {
                error!("Deleting user {} failed: {}", id, e);
                eprintln!("Failed to delete user {}: {}", id, e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Set up the terminal, run the users page, and restore the terminal
async fn run_tui(config: Config, api: Arc<dyn UsersApi>) -> Result<()> {
    info!("Starting userdesk TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, api);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(()) => {
            info!("userdesk TUI exited successfully");
            Ok(())
        }
        Err(e) => {
            error!("userdesk TUI encountered an error: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
