//! Config Command
//!
//! Manage script-expander configuration.
//!
//! Usage:
//!   script-expander config show [-f json]
//!   script-expander config path
//!   script-expander config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the effective configuration (defaults, files and env merged)
pub fn show(format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;
    println!("{}", ConfigLoader::render_config(&config, format == "json")?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize global or project configuration
pub fn init(global: bool, force: bool) -> Result<()> {
    let out = Output::new();
    let (scope, config_path) = if global {
        ("global", ConfigLoader::init_global(force)?)
    } else {
        ("project", ConfigLoader::init_project(force)?)
    };

    out.success(&format!("Initialized {} configuration", scope));
    out.info(&format!("Config: {}", config_path.display()));
    Ok(())
}
