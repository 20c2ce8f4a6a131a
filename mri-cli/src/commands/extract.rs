//! Extract command - run the full extraction

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::properties::property_table;
use super::{get_context, with_spinner};
use crate::output;

pub fn run(config_path: Option<&Path>, json: bool) -> Result<()> {
    let ctx = get_context(config_path)?;
    let extraction = with_spinner("Extracting from MRI...", || ctx.extraction_service.run())
        .context("Extraction failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
        return Ok(());
    }

    println!("{}", "MRI Extraction".bold());
    println!();

    let mut summary = Table::new();
    summary.set_content_arrangement(ContentArrangement::Dynamic);
    summary.add_row(vec!["Run", &extraction.run_id.to_string()]);
    summary.add_row(vec!["Banks", &extraction.banks.len().to_string()]);
    summary.add_row(vec!["Properties", &extraction.properties.len().to_string()]);
    summary.add_row(vec!["Units", &extraction.units.len().to_string()]);
    let elapsed = extraction.finished_at - extraction.started_at;
    summary.add_row(vec!["Duration", &format!("{:.1}s", elapsed.num_milliseconds() as f64 / 1000.0)]);
    println!("{}", summary);
    println!();

    if !extraction.properties.is_empty() {
        println!("{}", property_table(&extraction.properties));
    }

    output::warnings(&extraction.warnings);
    if extraction.warnings.is_empty() {
        output::success("Extraction completed");
    }
    Ok(())
}
