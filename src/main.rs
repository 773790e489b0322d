use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{
    AuthCommand, CalendarCommand, ConfigCommand, DashboardCommand, MealCommand, ProfileCommand,
    WaterCommand,
};
use config::Config;
use vitalog::auth::SessionContext;
use vitalog::db::init_db;
use vitalog::remote::ApiClient;
use vitalog::sync::SyncCoordinator;

#[derive(Parser)]
#[command(name = "vitalog")]
#[command(version)]
#[command(about = "A personal health tracking CLI", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register, log in and manage the saved session
    Auth(AuthCommand),

    /// Log meals and browse meal history
    Meal(MealCommand),

    /// Track daily water intake
    Water(WaterCommand),

    /// Browse logged meals by month or day
    Calendar(CalendarCommand),

    /// Show today's goals and progress
    Dashboard(DashboardCommand),

    /// View and update the user profile
    Profile(ProfileCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "vitalog=warn".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Auth(cmd)) => {
            let coordinator = build_coordinator(&config).await?;
            cmd.run(&coordinator).await?;
        }
        Some(Commands::Meal(cmd)) => {
            let coordinator = build_coordinator(&config).await?;
            cmd.run(&coordinator).await?;
        }
        Some(Commands::Water(cmd)) => {
            let coordinator = build_coordinator(&config).await?;
            cmd.run(&coordinator).await?;
        }
        Some(Commands::Calendar(cmd)) => {
            let coordinator = build_coordinator(&config).await?;
            cmd.run(&coordinator).await?;
        }
        Some(Commands::Dashboard(cmd)) => {
            let coordinator = build_coordinator(&config).await?;
            cmd.run(&coordinator).await?;
        }
        Some(Commands::Profile(cmd)) => {
            let coordinator = build_coordinator(&config).await?;
            cmd.run(&coordinator).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

/// Wires the API client, local cache and saved session together.
async fn build_coordinator(config: &Config) -> Result<SyncCoordinator, Box<dyn std::error::Error>> {
    let pool = init_db(config.database_path.value.clone()).await?;
    let context = SessionContext::load(config.session_file.value.clone());
    let api = ApiClient::new(
        config.server_url.value.clone(),
        Duration::from_secs(config.timeout_secs.value),
    )?;
    Ok(SyncCoordinator::new(api, pool, context))
}
