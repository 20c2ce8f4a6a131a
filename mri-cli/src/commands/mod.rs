//! CLI command implementations

pub mod banks;
pub mod config;
pub mod extract;
pub mod properties;
pub mod units;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use mri_core::config::Config;
use mri_core::services::TracingSink;
use mri_core::MriContext;

/// Get the MRI directory from environment or default
pub fn get_mri_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("MRI_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".mri"))
        .context("Could not find home directory (set MRI_DIR)")
}

/// Load settings from `config_path`, or from the MRI directory when unset
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load_file(path),
        None => Config::load(&get_mri_dir()?),
    }
}

/// Build the MRI context, logging through `tracing`
pub fn get_context(config_path: Option<&Path>) -> Result<MriContext> {
    let config = load_config(config_path)?;
    MriContext::new(config, Arc::new(TracingSink)).context("Failed to initialize MRI context")
}

/// Run `f` behind a spinner when stdout is a terminal
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    if !atty::is(atty::Stream::Stdout) {
        return f();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = f();
    spinner.finish_and_clear();
    result
}
