//! BobDSP Remote
//!
//! Command-line front end for a BobDSP host:
//! - `watch` follows the clients and ports long polls and logs every change
//! - `set` edits one control through the update coalescer
//! - `connections` lists and replaces the host's connection rules
//!
//! Host address comes from `--url` or `BOBDSP_URL`.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod cli;
mod client_commands;
mod commands;
mod connection_commands;
mod watch;

use bobdsp_client::{BobDspClient, ClientConfig};
use cli::{Cli, Commands};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ClientConfig::new(cli.url.clone());
    let api = Arc::new(BobDspClient::from_config(&config)?);

    match cli.command {
        Commands::Watch => watch::run(api).await,
        Commands::Clients { json } => client_commands::list_clients(&api, json).await,
        Commands::Set {
            client,
            control,
            value,
            slider,
        } => client_commands::set_control(api, &client, &control, value, slider).await,
        Commands::Add { name, plugin } => client_commands::add_client(&api, &name, &plugin).await,
        Commands::Delete { name } => client_commands::delete_client(&api, &name).await,
        Commands::Reload => client_commands::reload_clients(&api).await,
        Commands::Save => client_commands::save_clients(&api).await,
        Commands::Connections(cmd) => commands::handle_connection_command(api, cmd).await,
        Commands::Ports { json } => commands::handle_ports(&api, json).await,
        Commands::Plugins { json } => commands::handle_plugins(&api, json).await,
        Commands::Pattern { port, wildcard } => commands::handle_pattern(&port, wildcard),
    }
}
