//! `bdf id-types` command implementation

use crate::error::Result;
use bdf_common::IdentifierType;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

/// Show the accepted input identifier types
pub fn run() -> Result<()> {
    println!("{}", "Identifier Types:".cyan().bold());
    println!("{}", id_types_table());
    println!("Pass either the name or the code to --id-type");
    Ok(())
}

fn id_types_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Name", "Code"]);
    for ty in IdentifierType::ALL {
        table.add_row(vec![ty.display_name(), ty.system_code()]);
    }
    table
}
