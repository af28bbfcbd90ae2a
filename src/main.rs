use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use items_api_rust::config::AppConfig;
use items_api_rust::database::DatabaseManager;
use items_api_rust::{app, AppState};

#[derive(Parser)]
#[command(name = "items-api-rust")]
#[command(about = "Users and items REST API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect, prepare the store and serve HTTP (default)
    Serve,
    /// Connect, prepare the store and create the first superuser, then exit
    Init,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli.command.unwrap_or(Commands::Serve)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    let config = AppConfig::from_env();
    config.validate().context("invalid configuration")?;
    info!("Starting in {:?} mode", config.environment);

    let store = DatabaseManager::new(config.database.clone())
        .connect()
        .await
        .context("failed to connect to the store")?;
    let state = AppState::new(config, store);

    if let (Some(email), Some(password)) = (
        state.config.bootstrap.first_superuser.as_deref(),
        state.config.bootstrap.first_superuser_password.as_deref(),
    ) {
        state
            .users
            .ensure_first_superuser(email, password)
            .await
            .context("failed to create the first superuser")?;
    }

    match command {
        Commands::Init => {
            info!("Initial data created");
            Ok(())
        }
        Commands::Serve => serve(state).await,
    }
}

async fn serve(state: AppState) -> Result<()> {
    let bind_addr = format!("0.0.0.0:{}", state.config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Items API listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
