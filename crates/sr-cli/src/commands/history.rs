use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use sr_app::ExportFormat;

use super::Context;

pub fn show(ctx: &Context, page: usize, page_size: usize) -> Result<(), String> {
    let session = ctx.open_session();

    if session.history().is_empty() {
        println!("  No spins yet.");
        return Ok(());
    }

    let view = session.history_page(page, page_size);
    if view.entries.is_empty() {
        return Err(format!(
            "page {page} is out of range (1-{})",
            view.total_pages
        ));
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["When", "Decision", "Method", "Face", "Duration"]);
    for entry in view.entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.decision_text.clone(),
            entry.method.to_string(),
            entry.rolled_face.map_or_else(|| "-".into(), |f| f.to_string()),
            entry
                .duration_secs
                .map_or_else(|| "-".into(), |s| format!("{s}s")),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {}",
        format!(
            "Page {} of {} ({} spins)",
            view.page, view.total_pages, view.total_entries
        )
        .dimmed()
    );
    Ok(())
}

pub fn clear(ctx: &Context) -> Result<(), String> {
    let mut session = ctx.open_session();
    let count = session.history().len();
    session.clear_history();
    println!("  Cleared {count} history entries");
    Ok(())
}

pub fn export(ctx: &Context, format: ExportFormat) -> Result<(), String> {
    let session = ctx.open_session();
    print!("{}", session.export(format));
    Ok(())
}
