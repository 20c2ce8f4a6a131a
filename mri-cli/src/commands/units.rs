//! Units command - list the units of selected properties

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::{get_context, with_spinner};
use crate::output;

pub fn run(config_path: Option<&Path>, property_ids: &[String], json: bool) -> Result<()> {
    let ctx = get_context(config_path)?;
    let fetched = with_spinner("Fetching units...", || {
        ctx.extraction_service.fetch_units(property_ids)
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&fetched.units)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("{} unit(s) for {} property id(s)", fetched.units.len(), property_ids.len()).bold()
    );
    // Unit records are passed through as returned, one JSON object per line
    for unit in &fetched.units {
        println!("{}", serde_json::to_string(unit)?);
    }

    output::warnings(&fetched.warnings);
    Ok(())
}
