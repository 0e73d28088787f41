//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/script-expander/config.toml)
//! 3. Project config (.script-expander/config.toml)
//! 4. Environment variables (SCRIPT_EXPANDER_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
