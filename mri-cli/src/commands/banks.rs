//! Banks command - list the bank map

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::{get_context, with_spinner};
use crate::output;

pub fn run(config_path: Option<&Path>, json: bool) -> Result<()> {
    let ctx = get_context(config_path)?;
    let fetched = with_spinner("Fetching banks...", || ctx.extraction_service.fetch_bank_map())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&fetched.banks)?);
        return Ok(());
    }

    println!("{}", "Banks".bold());
    let mut table = output::create_table(&["BankID", "BankName"]);
    for (id, name) in fetched.banks.iter() {
        table.add_row(vec![id, output::or_dash(name)]);
    }
    println!("{}", table);

    output::warnings(&fetched.warnings);
    Ok(())
}
