//! Script Expander - Gap-Aware Expansion for Under-Length Scripts
//!
//! Takes a generated script that falls short of its word target, works out
//! which parts are missing or thin, asks a text-generation provider for only
//! that content, and splices the answer back without duplicating headings.
//!
//! ## Core Features
//!
//! - **Gap Analysis**: missing sections, underdeveloped sections, missing
//!   closing blocks and document-wide shortfalls, prioritized
//! - **Chunk Awareness**: closing blocks only on the final chunk; sections
//!   covered by earlier chunks are never regenerated
//! - **Duplicate-Safe Merge**: generated pieces are matched to existing
//!   headings and appended instead of re-inserted
//! - **Graceful Degradation**: provider failures and timeouts return the
//!   original document
//!
//! ## Quick Start
//!
//! ```ignore
//! use script_expander::{ContentPoint, ExpansionPolicy, expand_short_document};
//! use script_expander::ai::{ProviderConfig, create_provider};
//!
//! let provider = create_provider(&ProviderConfig::default())?;
//! let expanded = expand_short_document(
//!     provider,
//!     "### Intro\nHello.",
//!     &[ContentPoint::new("Intro"), ContentPoint::new("Conclusion")],
//!     500,
//!     None,
//!     None,
//!     &ExpansionPolicy::default(),
//! )
//! .await;
//! ```
//!
//! ## Modules
//!
//! - [`expansion`]: document AST, gap analysis, prompt building, merging
//! - [`ai`]: provider abstraction, prompt builder, timeouts
//! - [`config`]: layered configuration and expansion policy

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod expansion;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, ExpansionPolicy, LlmConfig};

// Error Types
pub use types::{ErrorCategory, ExpandError, LlmError, Result};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use expansion::{
    ChunkInfo, ContentPoint, Document, DocumentMerger, ExpansionEngine, ExpansionInput,
    ExpansionOutcome, ExpansionPromptBuilder, ExpansionReport, Gap, GapAnalysis, GapAnalyzer,
    GapKind, GapPriority, GenerationAdapter, GenerationRequest, MajorBlock, ReferenceContext,
    ReferenceSource, expand_short_document,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    GenerationParams, LlmProvider, LlmResponse, ProviderConfig, SharedProvider, create_provider,
    with_timeout,
};
