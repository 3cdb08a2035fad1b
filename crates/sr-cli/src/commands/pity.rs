use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use sr_app::ResetTarget;
use sr_core::selection::weight_for;
use sr_core::{PityConfig, PityConfigDraft, Scope, ScopeMode};

use super::Context;

/// Settings given on the command line; `None` keeps the stored value.
pub struct ConfigChanges {
    pub enabled: Option<bool>,
    pub soft_increment: Option<String>,
    pub hard_threshold: Option<String>,
    pub cap: Option<String>,
    pub auto_reset: Option<bool>,
}

pub fn show(ctx: &Context) -> Result<(), String> {
    let session = ctx.open_session();
    let scope = session.active_scope();
    let pity = session.pity();
    print_config(pity, &scope);

    let decisions = session.decisions();
    if decisions.is_empty() {
        println!();
        println!("  No decisions yet.");
        return Ok(());
    }

    let ledger = session.ledger();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Decision", "Misses", "Weight", "Hard hit"]);
    for text in decisions.as_slice() {
        let misses = ledger.count_for(&scope, text);
        let forced = pity.enabled && misses >= pity.hard_threshold;
        let weight = if forced {
            "forced".to_string()
        } else if pity.enabled {
            weight_for(misses, pity).to_string()
        } else {
            "1".to_string()
        };
        let hard_hit = if ledger.has_hard_hit(&scope, text) {
            "yes"
        } else {
            ""
        };
        table.add_row(vec![
            text.clone(),
            misses.to_string(),
            weight,
            hard_hit.to_string(),
        ]);
    }

    println!();
    println!("{table}");
    Ok(())
}

pub fn config(ctx: &Context, changes: ConfigChanges) -> Result<(), String> {
    let mut session = ctx.open_session();
    let mut draft = PityConfigDraft::from(session.pity());
    if let Some(enabled) = changes.enabled {
        draft.enabled = enabled;
    }
    if let Some(value) = changes.soft_increment {
        draft.soft_increment = value;
    }
    if let Some(value) = changes.hard_threshold {
        draft.hard_threshold = value;
    }
    if let Some(value) = changes.cap {
        draft.soft_multiplier_cap = value;
    }
    if let Some(auto_reset) = changes.auto_reset {
        draft.auto_reset_when_all_hard_hit = auto_reset;
    }

    session
        .save_pity_config(&draft)
        .map_err(|e| e.to_string())?;
    println!("  Saved pity settings");
    print_config(session.pity(), &session.active_scope());
    Ok(())
}

pub fn reset(ctx: &Context, all: bool, global: bool, preset: Option<&str>) -> Result<(), String> {
    let mut session = ctx.open_session();
    let target = if all {
        ResetTarget::All
    } else if global {
        ResetTarget::Scope(Scope::Global)
    } else if let Some(name) = preset {
        let id = session
            .presets()
            .find(name)
            .map(|p| p.id.clone())
            .ok_or_else(|| format!("no preset named '{name}'"))?;
        ResetTarget::Scope(Scope::preset(id))
    } else {
        ResetTarget::Selected
    };

    let label = match &target {
        ResetTarget::All => "all scopes".to_string(),
        ResetTarget::Active => format!("{} scope", session.active_scope()),
        ResetTarget::Selected => format!("{} scope", session.selected_scope()),
        ResetTarget::Scope(scope) => format!("{scope} scope"),
    };
    session.reset_pity(target);
    println!("  Reset pity for {label}");
    Ok(())
}

pub fn scope(ctx: &Context, mode: ScopeMode) -> Result<(), String> {
    let mut session = ctx.open_session();
    session.set_scope_mode(mode);
    println!("  Pity resets now target {mode} counters");
    if mode == ScopeMode::Preset && session.active_preset().is_none() {
        println!(
            "  {}",
            "No preset is applied; resets target global counters until one is.".yellow()
        );
    }
    Ok(())
}

fn print_config(pity: &PityConfig, scope: &Scope) {
    let state = if pity.enabled {
        "on".green()
    } else {
        "off".red()
    };
    println!("  {} {state}  {}", "Pity".bold(), format!("({scope})").dimmed());
    println!(
        "  soft increment {}, hard threshold {}, weight cap {}, auto reset {}",
        pity.soft_increment,
        pity.hard_threshold,
        pity.soft_multiplier_cap,
        if pity.auto_reset_when_all_hard_hit {
            "on"
        } else {
            "off"
        }
    );
}
