//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! Policy values here are only defaults; `ExpansionPolicy` carries the
//! effective values and can be overridden through configuration.

/// Document markup constants
pub mod markup {
    /// Marker for mandatory closing blocks (description, tags)
    pub const MAJOR_HEADING: &str = "##";

    /// Marker for ordinary content sections
    pub const MINOR_HEADING: &str = "###";

    /// Deepest heading level recognised by the parser
    pub const MAX_HEADING_LEVEL: usize = 6;

    /// Canonical title for the description block
    pub const DESCRIPTION_TITLE: &str = "Description";

    /// Canonical title for the tags block
    pub const TAGS_TITLE: &str = "Tags";
}

/// Gap analysis constants
pub mod analysis {
    /// A section below this fraction of its fair share is underdeveloped
    pub const UNDERDEVELOPED_THRESHOLD: f64 = 0.4;

    /// Word budget for a missing description block
    pub const DESCRIPTION_BLOCK_WORDS: usize = 150;

    /// Word budget for a missing tags block
    pub const TAGS_BLOCK_WORDS: usize = 50;

    /// Minimum deficit before a document-wide expansion gap is emitted
    pub const GENERAL_EXPANSION_MIN_WORDS: usize = 50;
}

/// Expansion request constants
pub mod request {
    /// Maximum gaps addressed by a single generation request
    pub const MAX_GAPS_PER_REQUEST: usize = 3;

    /// Output tokens requested per target word
    pub const TOKENS_PER_WORD: f64 = 2.0;

    /// Ceiling for the output-size parameter
    pub const MAX_OUTPUT_TOKENS: usize = 8192;

    /// Floor for the output-size parameter
    pub const MIN_OUTPUT_TOKENS: usize = 512;

    /// Maximum reference snippets appended to a prompt
    pub const MAX_REFERENCE_SNIPPETS: usize = 5;

    /// Maximum characters kept from one reference excerpt
    pub const MAX_REFERENCE_EXCERPT_CHARS: usize = 600;
}

/// HTTP/Network constants
pub mod network {
    /// Ceiling for a single generation call (seconds)
    pub const GENERATION_TIMEOUT_SECS: u64 = 60;

    /// Default provider request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
