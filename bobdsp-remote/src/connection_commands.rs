use anyhow::{Context, Result};
use bobdsp_client::{BobDspClient, ConnectionEditor};
use bobdsp_types::ConnectionRule;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use std::path::Path;
use std::sync::Arc;

pub async fn list_rules(api: Arc<BobDspClient>, json: bool) -> Result<()> {
    let mut editor = ConnectionEditor::new(api);
    let rules = editor.load().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(rules)?);
        return Ok(());
    }
    print_rules(rules);
    Ok(())
}

fn print_rules(rules: &[ConnectionRule]) {
    if rules.is_empty() {
        println!("{}", "No connection rules.".yellow());
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Output", "Input", "Disconnect"]);

    for (i, rule) in rules.iter().enumerate() {
        let disconnect = match (rule.out_disconnect, rule.in_disconnect) {
            (true, true) => "out, in",
            (true, false) => "out",
            (false, true) => "in",
            (false, false) => "-",
        };
        let invalid = !rule.invalid_patterns().is_empty();
        let color = if invalid { Color::Red } else { Color::Reset };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.out_pattern).fg(color),
            Cell::new(&rule.in_pattern).fg(color),
            Cell::new(disconnect),
        ]);
    }

    println!("{table}");
    println!("\n{} rules total", rules.len());
}

/// Accepts either a bare array of rules or a `{"connections": [...]}` document.
fn read_rules(path: &Path) -> Result<Vec<ConnectionRule>> {
    let content = std::fs::read_to_string(path).context("Failed to read file")?;
    let doc: serde_json::Value = serde_json::from_str(&content).context("Failed to parse JSON")?;
    let rules = match doc.get("connections") {
        Some(list) => list.clone(),
        None => doc,
    };
    serde_json::from_value(rules).context("Failed to parse connection rules")
}

pub async fn apply_file(api: Arc<BobDspClient>, path: &Path, save: bool) -> Result<()> {
    let rules = read_rules(path)?;
    let mut editor = ConnectionEditor::new(api);
    *editor.rules_mut() = rules;

    let accepted = if save {
        editor.apply_and_save().await?
    } else {
        editor.apply().await?
    };
    println!(
        "{} Host now holds {} rules{}",
        "✓".green(),
        accepted.len(),
        if save { " (saved)" } else { "" }
    );
    print_rules(accepted);
    Ok(())
}

pub async fn save_rules(api: Arc<BobDspClient>) -> Result<()> {
    let mut editor = ConnectionEditor::new(api);
    editor.load().await?;
    let saved = editor.apply_and_save().await?;
    println!("{} Saved {} connection rules", "✓".green(), saved.len());
    Ok(())
}

pub async fn reload_rules(api: Arc<BobDspClient>) -> Result<()> {
    let mut editor = ConnectionEditor::new(api);
    let rules = editor.restore().await?;
    println!("{} Reloaded {} connection rules", "✓".green(), rules.len());
    print_rules(rules);
    Ok(())
}
