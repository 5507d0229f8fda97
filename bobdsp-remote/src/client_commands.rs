use anyhow::{bail, Context, Result};
use bobdsp_client::{BobDspClient, ClientMirror, PluginCatalog, UpdateCoalescer};
use bobdsp_types::protocol::{AddClient, WireClient};
use bobdsp_types::{ControlEdit, ControlKind, ControlState};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use std::sync::Arc;

/// Fetches the client list into a fresh mirror.
async fn load_mirror(api: &BobDspClient) -> Result<ClientMirror> {
    let resp = api.fetch_clients().await?;
    let mirror = ClientMirror::new();
    mirror
        .apply_response(&resp)
        .context("Host sent an invalid client list")?;
    Ok(mirror)
}

pub async fn list_clients(api: &BobDspClient, json: bool) -> Result<()> {
    let mirror = load_mirror(api).await?;
    let clients = mirror.clients();

    if json {
        let wire: Vec<WireClient> = clients.iter().map(WireClient::from_snapshot).collect();
        println!("{}", serde_json::to_string_pretty(&wire)?);
        return Ok(());
    }

    if clients.is_empty() {
        println!("{}", "No clients found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Client", "Plugin", "Control", "Value", "Kind", "Range"]);

    for client in &clients {
        let plugin = client
            .plugin
            .as_ref()
            .map_or_else(|| "-".to_string(), |p| p.label.clone());
        for (i, control) in client.controls().iter().enumerate() {
            let (name, plugin) = if i == 0 {
                (client.name.as_str(), plugin.as_str())
            } else {
                ("", "")
            };
            table.add_row(vec![
                Cell::new(name).fg(Color::Cyan),
                Cell::new(plugin),
                Cell::new(&control.name),
                value_cell(control),
                Cell::new(kind_name(control.kind)),
                Cell::new(range(control)),
            ]);
        }
    }

    let versions = mirror.versions();
    println!("{table}");
    println!(
        "\n{} clients (clientVersion {}, controlVersion {}, session {})",
        clients.len(),
        versions.client_version,
        versions.control_version,
        versions.session_id
    );
    Ok(())
}

fn value_cell(control: &ControlState) -> Cell {
    match control.kind {
        ControlKind::Boolean if control.is_on() => Cell::new("on").fg(Color::Green),
        ControlKind::Boolean => Cell::new("off").fg(Color::Red),
        _ => Cell::new(control.value()),
    }
}

fn kind_name(kind: ControlKind) -> &'static str {
    match kind {
        ControlKind::Linear => "linear",
        ControlKind::Logarithmic => "log",
        ControlKind::Integer => "integer",
        ControlKind::Boolean => "toggle",
    }
}

fn range(control: &ControlState) -> String {
    match (control.lower_bound, control.upper_bound) {
        (Some(lower), Some(upper)) => format!("{lower} .. {upper}"),
        (Some(lower), None) => format!(">= {lower}"),
        (None, Some(upper)) => format!("<= {upper}"),
        (None, None) => "-".to_string(),
    }
}

pub async fn set_control(api: Arc<BobDspClient>, client: &str, control: &str, value: f64, slider: bool) -> Result<()> {
    let mirror = load_mirror(&api).await?;
    let state = mirror
        .with_clients(|c| c.control(client, control).cloned())
        .with_context(|| format!("No control {control:?} on client {client:?}"))?;

    let edit = if slider {
        slider_edit(&state, value)?
    } else if state.kind == ControlKind::Boolean {
        ControlEdit::Toggle(value != 0.0)
    } else {
        ControlEdit::Value(value)
    };

    let updates = UpdateCoalescer::new(api, mirror.clone());
    if !updates.edit(client, control, edit)? {
        println!("{} {}.{} already at that value", "=".yellow(), client, control);
        return Ok(());
    }
    updates.flush().await?;

    let now = mirror
        .with_clients(|c| c.control(client, control).map(ControlState::value))
        .unwrap_or(value);
    println!("{} {}.{} = {}", "✓".green(), client, control, now);
    Ok(())
}

/// Turns a `[0, 1]` slider fraction into a slider edit over the control's range.
fn slider_edit(control: &ControlState, fraction: f64) -> Result<ControlEdit> {
    if !(0.0..=1.0).contains(&fraction) {
        bail!("Slider position must be within [0, 1], got {fraction}");
    }
    if !control.has_slider() {
        bail!("Control {:?} has no slider", control.name);
    }
    let (min, max) = control
        .bounds()
        .with_context(|| format!("Control {:?} has no bounds", control.name))?;
    Ok(ControlEdit::Slider(min + fraction * (max - min)))
}

pub async fn add_client(api: &Arc<BobDspClient>, name: &str, plugin: &str) -> Result<()> {
    let mirror = load_mirror(api).await?;
    let catalog = PluginCatalog::new(api.clone());
    catalog.plugins(&mirror.session_id()).await?;
    let info = catalog
        .find(plugin)
        .with_context(|| format!("Plugin {plugin:?} not found"))?;

    api.add_client(AddClient::for_plugin(name, &info)).await?;
    println!("{} Client added: {} ({})", "✓".green(), name.green(), info.name);
    Ok(())
}

pub async fn delete_client(api: &BobDspClient, name: &str) -> Result<()> {
    api.delete_client(name).await?;
    println!("{} Client deleted: {}", "✓".green(), name.green());
    Ok(())
}

pub async fn reload_clients(api: &BobDspClient) -> Result<()> {
    api.reload_clients().await?;
    println!("{} Client setup reloaded", "✓".green());
    Ok(())
}

pub async fn save_clients(api: &BobDspClient) -> Result<()> {
    api.save_clients().await?;
    println!("{} Client setup saved", "✓".green());
    Ok(())
}
