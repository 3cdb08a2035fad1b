use comfy_table::{ContentArrangement, Table};

use super::Context;

pub fn add(ctx: &Context, texts: &[String]) -> Result<(), String> {
    let mut session = ctx.open_session();
    for text in texts {
        session.add_decision(text).map_err(|e| e.to_string())?;
        println!("  Added '{}'", text.trim());
    }
    println!("  {} decisions", session.decisions().len());
    Ok(())
}

pub fn remove(ctx: &Context, position: usize) -> Result<(), String> {
    let mut session = ctx.open_session();
    let removed = session
        .remove_decision(position)
        .map_err(|e| e.to_string())?;
    println!("  Removed '{removed}'");
    Ok(())
}

pub fn clear(ctx: &Context) -> Result<(), String> {
    let mut session = ctx.open_session();
    let count = session.decisions().len();
    session.clear_decisions();
    println!("  Cleared {count} decisions");
    Ok(())
}

pub fn list(ctx: &Context) -> Result<(), String> {
    let session = ctx.open_session();
    let decisions = session.decisions();

    if decisions.is_empty() {
        println!("  No decisions yet. Add some with `spinnrad add`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Decision"]);
    for (i, text) in decisions.as_slice().iter().enumerate() {
        table.add_row(vec![(i + 1).to_string(), text.clone()]);
    }

    println!("{table}");
    println!();
    match session.active_preset() {
        Some(preset) => println!("  {} decisions (preset '{}')", decisions.len(), preset.name),
        None => println!("  {} decisions", decisions.len()),
    }
    Ok(())
}
