use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod client;
mod commands;
mod config;
mod render;

use client::TabshareHttp;
use config::ConfigLoader;

#[derive(Parser)]
#[command(name = "tabshare", about = "Split a restaurant bill with the people at your table")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Server URL (defaults to the configured host and port)
    #[arg(long, global = true)]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the tabshare server
    Serve(commands::serve::ServeArgs),
    /// Create, inspect and settle sessions
    Session(commands::session::SessionArgs),
    /// Join a session under your display name
    Join(commands::participant::JoinArgs),
    /// Claim or release an item
    Claim(commands::participant::ClaimArgs),
    /// Leave a session, releasing your claims
    Leave(commands::participant::LeaveArgs),
    /// Follow a session live and claim items interactively
    Watch(commands::watch::WatchArgs),
    /// Show or change this device's identity
    Identity(commands::identity::IdentityArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigLoader::load()?;
    let base_url = cli.server.clone().unwrap_or_else(|| config.server.base_url());
    let http = TabshareHttp::new(base_url);

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args, config).await,
        Commands::Session(args) => commands::session::run(args, &http).await,
        Commands::Join(args) => commands::participant::join(args, &http).await,
        Commands::Claim(args) => commands::participant::claim(args, &http).await,
        Commands::Leave(args) => commands::participant::leave(args, &http).await,
        Commands::Watch(args) => commands::watch::run(args, http.base_url()).await,
        Commands::Identity(args) => commands::identity::run(args).await,
        Commands::Config(args) => commands::config::run(args, &config),
    }
}
