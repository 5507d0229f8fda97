use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "bobdsp-remote",
    about = "BobDSP Remote - drive a BobDSP host from the terminal",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, env = "BOBDSP_URL", default_value = bobdsp_client::DEFAULT_BASE_URL)]
    pub url: String,

    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Follow clients and ports until interrupted")]
    Watch,

    #[command(about = "List clients and their controls")]
    Clients {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Set a control value")]
    Set {
        #[arg(help = "Client name")]
        client: String,

        #[arg(help = "Control name (instances, pregain, postgain or a plugin control)")]
        control: String,

        #[arg(allow_negative_numbers = true, help = "New value")]
        value: f64,

        #[arg(long, help = "Treat the value as a slider position in [0, 1] across the control's range")]
        slider: bool,
    },

    #[command(about = "Add a client running a plugin")]
    Add {
        #[arg(help = "Name of the new client")]
        name: String,

        #[arg(help = "Plugin label")]
        plugin: String,
    },

    #[command(about = "Delete a client")]
    Delete {
        #[arg(help = "Client name")]
        name: String,
    },

    #[command(about = "Reload the persisted client setup on the host")]
    Reload,

    #[command(about = "Persist the current client setup on the host")]
    Save,

    #[command(subcommand, about = "View and edit connection rules")]
    Connections(ConnectionCommands),

    #[command(about = "List the host's ports")]
    Ports {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "List the host's plugins")]
    Plugins {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Build a connection rule pattern from a port name")]
    Pattern {
        #[arg(help = "Port name, e.g. eq2:output_1")]
        port: String,

        #[arg(short, long, help = "Replace client instance numbers with a wildcard")]
        wildcard: bool,
    },
}

#[derive(Subcommand)]
pub enum ConnectionCommands {
    #[command(about = "List connection rules")]
    List {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Replace the host's rules with the ones in a JSON file")]
    ApplyFile {
        #[arg(help = "Path to a JSON array of rules")]
        file: PathBuf,

        #[arg(long, help = "Persist the rules after applying them")]
        save: bool,
    },

    #[command(about = "Persist the host's current rules")]
    Save,

    #[command(about = "Discard unsaved rules and reload the persisted ones")]
    Reload,
}
