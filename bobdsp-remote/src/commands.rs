use anyhow::Result;
use bobdsp_client::BobDspClient;
use bobdsp_types::{pattern, PortDirection};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use std::sync::Arc;

use crate::cli::ConnectionCommands;

mod connection_commands_impl {
    pub use crate::connection_commands::*;
}

pub async fn handle_connection_command(api: Arc<BobDspClient>, cmd: ConnectionCommands) -> Result<()> {
    match cmd {
        ConnectionCommands::List { json } => connection_commands_impl::list_rules(api, json).await,
        ConnectionCommands::ApplyFile { file, save } => {
            connection_commands_impl::apply_file(api, &file, save).await
        }
        ConnectionCommands::Save => connection_commands_impl::save_rules(api).await,
        ConnectionCommands::Reload => connection_commands_impl::reload_rules(api).await,
    }
}

pub async fn handle_ports(api: &BobDspClient, json: bool) -> Result<()> {
    let resp = api.fetch_ports().await?;
    let ports = resp.ports.unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    if ports.is_empty() {
        println!("{}", "No ports found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Port", "Direction"]);
    for port in &ports {
        let direction = match port.direction {
            PortDirection::Output => Cell::new("output").fg(Color::Cyan),
            PortDirection::Input => Cell::new("input").fg(Color::Magenta),
        };
        table.add_row(vec![Cell::new(&port.name), direction]);
    }

    println!("{table}");
    println!("\n{} ports (index {}, uuid {})", ports.len(), resp.index, resp.uuid);
    Ok(())
}

pub async fn handle_plugins(api: &BobDspClient, json: bool) -> Result<()> {
    let plugins = api.fetch_plugins().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plugins)?);
        return Ok(());
    }

    if plugins.is_empty() {
        println!("{}", "No plugins found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Name", "Label", "ID", "Controls"]);
    for info in &plugins {
        let controls: Vec<&str> = info.controls.iter().map(|c| c.name.as_str()).collect();
        table.add_row(vec![
            Cell::new(&info.name),
            Cell::new(&info.plugin.label),
            Cell::new(info.plugin.unique_id),
            Cell::new(controls.join(", ")),
        ]);
    }

    println!("{table}");
    println!("\n{} plugins total", plugins.len());
    Ok(())
}

pub fn handle_pattern(port: &str, wildcard: bool) -> Result<()> {
    println!("{}", pattern::build(port, wildcard));
    Ok(())
}
