use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::Context;

pub fn save(ctx: &Context, name: &str) -> Result<(), String> {
    let mut session = ctx.open_session();
    let preset = session.save_preset(name).map_err(|e| e.to_string())?;
    println!(
        "  Saved preset '{}' with {} decisions",
        preset.name,
        preset.decisions.len()
    );
    Ok(())
}

pub fn apply(ctx: &Context, name: &str) -> Result<(), String> {
    let mut session = ctx.open_session();
    let preset = session.apply_preset(name).map_err(|e| e.to_string())?;
    println!(
        "  Applied preset '{}' ({} decisions)",
        preset.name,
        preset.decisions.len()
    );
    Ok(())
}

pub fn delete(ctx: &Context, name: &str) -> Result<(), String> {
    let mut session = ctx.open_session();
    let preset = session.delete_preset(name).map_err(|e| e.to_string())?;
    println!("  Deleted preset '{}'", preset.name);
    Ok(())
}

pub fn list(ctx: &Context) -> Result<(), String> {
    let session = ctx.open_session();
    let presets = session.presets();

    if presets.is_empty() {
        println!("  No presets saved.");
        return Ok(());
    }

    let active = session.active_preset().map(|p| p.id.as_str());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Name", "Decisions", "Id"]);
    for preset in presets.all() {
        let marker = if active == Some(preset.id.as_str()) {
            "*"
        } else {
            ""
        };
        table.add_row(vec![
            marker.to_string(),
            preset.name.clone(),
            preset.decisions.join(", "),
            preset.id.clone(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} presets {}", presets.len(), "(* = active)".dimmed());
    Ok(())
}
