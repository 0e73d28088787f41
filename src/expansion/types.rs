//! Expansion data model
//!
//! Inputs supplied by the caller (content points, chunk descriptor, reference
//! context), the gap analysis produced from them, and the generation request
//! handed to the provider. Everything is created per call and discarded.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::document::MajorBlock;
use crate::ai::provider::GenerationParams;

// =============================================================================
// Caller Inputs
// =============================================================================

/// A required unit of content, identified by its title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPoint {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ContentPoint {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Description or empty string
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Position of the current document within a multi-pass generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkInfo {
    pub chunk_number: usize,
    pub total_chunks: usize,
    pub start_time: String,
    pub end_time: String,
    pub is_first: bool,
    pub is_last: bool,
    #[serde(default)]
    pub previously_covered_sections: Vec<String>,
}

impl ChunkInfo {
    /// Whether `title` was already produced by an earlier chunk
    pub fn covers(&self, title: &str) -> bool {
        let wanted = title.trim().to_lowercase();
        self.previously_covered_sections
            .iter()
            .any(|s| s.trim().to_lowercase() == wanted)
    }
}

/// Supporting research supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceContext {
    #[serde(default)]
    pub sources: Vec<ReferenceSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSource {
    pub title: String,
    pub excerpt: String,
}

// =============================================================================
// Gaps
// =============================================================================

/// What kind of shortfall a gap describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// Content point has no section at all
    MissingSection,
    /// Content point has a section that is too short
    UnderdevelopedSection,
    /// A mandatory closing block is absent (terminal chunk only)
    MissingMajorBlock(MajorBlock),
    /// Deficit spread across all existing sections
    GeneralExpansion,
    /// Deficit for a document without sections
    ContentExpansion,
}

impl GapKind {
    /// Whether the gap targets the document as a whole
    pub fn is_document_wide(&self) -> bool {
        matches!(self, Self::GeneralExpansion | Self::ContentExpansion)
    }
}

impl fmt::Display for GapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSection => write!(f, "missing_section"),
            Self::UnderdevelopedSection => write!(f, "underdeveloped_section"),
            Self::MissingMajorBlock(block) => {
                write!(f, "missing_major_block({})", block.title().to_lowercase())
            }
            Self::GeneralExpansion => write!(f, "general_expansion"),
            Self::ContentExpansion => write!(f, "content_expansion"),
        }
    }
}

/// Gap priority; declaration order is sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for GapPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A detected shortfall with its word budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub kind: GapKind,
    pub title: String,
    pub description: String,
    pub priority: GapPriority,
    pub estimated_words: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_count: Option<usize>,
}

impl Gap {
    pub fn new(
        kind: GapKind,
        title: impl Into<String>,
        priority: GapPriority,
        estimated_words: usize,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: String::new(),
            priority,
            estimated_words,
            section_count: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_section_count(mut self, count: usize) -> Self {
        self.section_count = Some(count);
        self
    }
}

/// Result of comparing a document against its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub gaps: Vec<Gap>,
    /// `target_words - current_words`; may be negative
    pub words_needed: i64,
    pub current_words: usize,
    pub target_words: usize,
}

impl GapAnalysis {
    /// Analysis with an empty gap list
    pub fn new(current_words: usize, target_words: usize) -> Self {
        Self {
            gaps: Vec::new(),
            words_needed: target_words as i64 - current_words as i64,
            current_words,
            target_words,
        }
    }

    pub fn is_sufficient(&self) -> bool {
        self.words_needed <= 0
    }

    /// Highest-priority gaps, capped at `limit`
    pub fn top_gaps(&self, limit: usize) -> &[Gap] {
        &self.gaps[..self.gaps.len().min(limit)]
    }

    pub fn has_document_wide_gap(&self) -> bool {
        self.gaps.iter().any(|g| g.kind.is_document_wide())
    }
}

// =============================================================================
// Generation Request / Outcome
// =============================================================================

/// Single request sent to the generation provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt_text: String,
    pub word_target: usize,
    pub model_params: GenerationParams,
}

/// Terminal state of one expansion call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionOutcome {
    /// Document already meets the target
    Sufficient,
    /// Deficit exists but nothing actionable was detected
    NoGapsFound,
    /// Provider failed, timed out or returned nothing usable
    GenerationFailed,
    /// Generated content merged into the document
    Merged,
}

impl fmt::Display for ExpansionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sufficient => write!(f, "sufficient"),
            Self::NoGapsFound => write!(f, "no_gaps_found"),
            Self::GenerationFailed => write!(f, "generation_failed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Document plus the path taken to produce it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionReport {
    pub document: String,
    pub outcome: ExpansionOutcome,
    pub analysis: GapAnalysis,
}
