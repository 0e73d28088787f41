//! CLI Input/Output Files
//!
//! Content points, chunk descriptors and reference context are read from
//! JSON or YAML files, chosen by extension. Documents are plain text.

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::types::{ExpandError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(ExpandError::input(
                path.display().to_string(),
                "expected a .json, .yaml or .yml file",
            )),
        }
    }
}

/// Read and deserialize a JSON/YAML input file
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = InputFormat::from_path(path)?;
    let content = read_text(path)?;

    let parsed = match format {
        InputFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
        InputFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| ExpandError::input(path.display().to_string(), message))
}

/// Read a document as-is
pub fn read_document(path: &Path) -> Result<String> {
    read_text(path)
}

/// Write a document to `path`, or stdout when absent
pub fn write_document(path: Option<&Path>, document: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, document)?;
        }
        None => print!("{}", document),
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| ExpandError::input(path.display().to_string(), e.to_string()))
}
