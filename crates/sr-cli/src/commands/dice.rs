use comfy_table::{ContentArrangement, Table};

use sr_core::{DiceFaceDraft, DiceTable};

use super::Context;

pub fn show(ctx: &Context) -> Result<(), String> {
    let session = ctx.open_session();
    print_table(session.dice());
    Ok(())
}

pub fn set(ctx: &Context, faces: &[String]) -> Result<(), String> {
    let drafts = faces
        .iter()
        .map(|arg| parse_face(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let mut session = ctx.open_session();
    let dice = session
        .save_dice_table(&drafts)
        .map_err(|e| e.to_string())?;
    println!("  Saved dice table with {} faces", dice.len());
    Ok(())
}

pub fn reset(ctx: &Context) -> Result<(), String> {
    let mut session = ctx.open_session();
    let dice = session.reset_dice_table();
    println!("  Restored the default dice table");
    print_table(dice);
    Ok(())
}

/// Parse `FACE=SECONDS`. The numbers are validated with the whole table.
fn parse_face(arg: &str) -> Result<DiceFaceDraft, String> {
    let (face, secs) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected FACE=SECONDS, got '{arg}'"))?;
    Ok(DiceFaceDraft::new(face.trim(), secs.trim()))
}

fn print_table(dice: &DiceTable) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Face", "Spin duration"]);
    for face in dice.faces() {
        table.add_row(vec![face.face.to_string(), format!("{}s", face.duration_secs)]);
    }
    println!("{table}");
}
