//! Properties command - list properties joined to their banks

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use mri_core::PropertyDetail;

use super::{get_context, with_spinner};
use crate::output;

pub fn run(config_path: Option<&Path>, json: bool) -> Result<()> {
    let ctx = get_context(config_path)?;
    let service = &ctx.extraction_service;

    let (properties, warnings) = with_spinner("Fetching properties...", || {
        let banks = service.fetch_bank_map()?;
        let fetched = service.fetch_property_details(&banks.banks)?;
        let mut warnings = banks.warnings;
        warnings.extend(fetched.warnings);
        Ok::<_, mri_core::Error>((fetched.properties, warnings))
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&properties)?);
        return Ok(());
    }

    println!("{}", "Properties".bold());
    println!("{}", property_table(&properties));

    output::warnings(&warnings);
    Ok(())
}

pub fn property_table(properties: &[PropertyDetail]) -> comfy_table::Table {
    let mut table = output::create_table(&["PropertyID", "Name", "City", "State", "Manager", "Banks"]);
    for p in properties {
        let banks = p.bank.join(", ");
        table.add_row(vec![
            output::or_dash(&p.property_id),
            output::or_dash(&p.property_name),
            output::or_dash(&p.address.city),
            output::or_dash(&p.address.state),
            output::or_dash(&p.manager_name),
            output::or_dash(&banks),
        ]);
    }
    table
}
