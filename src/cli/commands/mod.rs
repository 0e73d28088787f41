//! Subcommand implementations

pub mod analyze;
pub mod config;
pub mod expand;

use std::path::PathBuf;

use crate::cli::input::{read_document, read_structured};
use crate::expansion::ExpansionInput;
use crate::types::Result;

/// Input files shared by `expand` and `analyze`
#[derive(Debug, Clone, Default)]
pub struct InputPaths {
    pub document: PathBuf,
    pub points: PathBuf,
    pub target_words: usize,
    pub chunk: Option<PathBuf>,
    pub references: Option<PathBuf>,
}

impl InputPaths {
    pub fn load(&self) -> Result<ExpansionInput> {
        Ok(ExpansionInput {
            document: read_document(&self.document)?,
            content_points: read_structured(&self.points)?,
            target_words: self.target_words,
            chunk: self.chunk.as_deref().map(read_structured).transpose()?,
            references: self.references.as_deref().map(read_structured).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_all_inputs() {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("script.md");
        let points = dir.path().join("points.yaml");
        let references = dir.path().join("refs.json");
        fs::write(&document, "### Intro\nHello.").unwrap();
        fs::write(&points, "- title: Intro\n- title: Conclusion\n").unwrap();
        fs::write(
            &references,
            r#"{"sources": [{"title": "Study", "excerpt": "Habits compound."}]}"#,
        )
        .unwrap();

        let input = InputPaths {
            document,
            points,
            target_words: 500,
            chunk: None,
            references: Some(references),
        }
        .load()
        .unwrap();

        assert_eq!(input.document, "### Intro\nHello.");
        assert_eq!(input.content_points.len(), 2);
        assert!(input.chunk.is_none());
        assert_eq!(input.references.map(|r| r.sources.len()), Some(1));
    }
}
