//! Config command - show the effective configuration

use std::path::Path;

use anyhow::Result;

use super::load_config;

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config.redacted())?);
    Ok(())
}
