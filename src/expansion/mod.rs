//! Document Expansion Pipeline
//!
//! Brings an under-length script up to its word target:
//!
//! ```text
//! document + content points
//!     → GapAnalyzer          (typed, prioritized gaps)
//!     → ExpansionPromptBuilder (one generation request)
//!     → GenerationAdapter    (single provider call under a timeout)
//!     → DocumentMerger       (duplicate-safe splice)
//! ```
//!
//! Every call is terminal after at most one generation call. Provider
//! failures and timeouts degrade to returning the original document.

pub mod document;
pub mod gap_analyzer;
pub mod generator;
pub mod merger;
pub mod prompt;
pub mod types;

pub use document::{Document, MajorBlock, Section, word_count};
pub use gap_analyzer::{GapAnalyzer, analyze_gaps};
pub use generator::{GenerationAdapter, strip_preamble};
pub use merger::{DocumentMerger, merge_expansion};
pub use prompt::ExpansionPromptBuilder;
pub use types::{
    ChunkInfo, ContentPoint, ExpansionOutcome, ExpansionReport, Gap, GapAnalysis, GapKind,
    GapPriority, GenerationRequest, ReferenceContext, ReferenceSource,
};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::ai::provider::SharedProvider;
use crate::config::{Config, ExpansionPolicy};

/// Everything one expansion call needs from the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpansionInput {
    pub document: String,
    #[serde(default)]
    pub content_points: Vec<ContentPoint>,
    pub target_words: usize,
    #[serde(default)]
    pub chunk: Option<ChunkInfo>,
    #[serde(default)]
    pub references: Option<ReferenceContext>,
}

pub struct ExpansionEngine {
    analyzer: GapAnalyzer,
    prompts: ExpansionPromptBuilder,
    adapter: GenerationAdapter,
    merger: DocumentMerger,
}

impl ExpansionEngine {
    pub fn new(provider: SharedProvider, policy: ExpansionPolicy) -> Self {
        let prompts = ExpansionPromptBuilder::new(policy.clone())
            .with_model(provider.model(), crate::config::LlmConfig::default().temperature);
        let adapter = GenerationAdapter::new(provider)
            .with_timeout(Duration::from_secs(policy.generation_timeout_secs));

        Self {
            analyzer: GapAnalyzer::new(policy.clone()),
            prompts,
            adapter,
            merger: DocumentMerger::new(&policy),
        }
    }

    /// Engine using the policy, model and temperature from `config`
    pub fn from_config(provider: SharedProvider, config: &Config) -> Self {
        Self::new(provider, config.expansion.clone()).with_temperature(config.llm.temperature)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        let model = self.adapter.provider().model().to_string();
        self.prompts = self.prompts.with_model(model, temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.adapter = self.adapter.with_timeout(timeout);
        self
    }

    pub fn analyze(&self, input: &ExpansionInput) -> GapAnalysis {
        self.analyzer.analyze(
            &input.document,
            &input.content_points,
            input.target_words,
            input.chunk.as_ref(),
        )
    }

    /// Generation request for an analysis, without calling the provider
    pub fn prepare(&self, input: &ExpansionInput, analysis: &GapAnalysis) -> GenerationRequest {
        self.prompts.build(
            &input.document,
            analysis,
            input.chunk.as_ref(),
            input.references.as_ref(),
        )
    }

    /// Run the full pipeline. Never fails; the outcome records which path ran.
    pub async fn expand(&self, input: &ExpansionInput) -> ExpansionReport {
        let analysis = self.analyze(input);

        if analysis.is_sufficient() {
            info!(
                "Document already has {} of {} words",
                analysis.current_words, analysis.target_words
            );
            return report(&input.document, ExpansionOutcome::Sufficient, analysis);
        }

        if analysis.gaps.is_empty() {
            info!(
                "{} words short but no actionable gaps found",
                analysis.words_needed
            );
            return report(&input.document, ExpansionOutcome::NoGapsFound, analysis);
        }

        let request = self.prepare(input, &analysis);
        let Some(expansion) = self.adapter.generate(&request).await else {
            return report(&input.document, ExpansionOutcome::GenerationFailed, analysis);
        };

        let document = self
            .merger
            .merge(&input.document, Some(&expansion), &analysis);
        ExpansionReport {
            document,
            outcome: ExpansionOutcome::Merged,
            analysis,
        }
    }
}

fn report(document: &str, outcome: ExpansionOutcome, analysis: GapAnalysis) -> ExpansionReport {
    ExpansionReport {
        document: document.to_string(),
        outcome,
        analysis,
    }
}

/// Expand `document` toward `target_words`, returning the original text
/// unchanged when nothing is needed or generation fails.
pub async fn expand_short_document(
    provider: SharedProvider,
    document: &str,
    content_points: &[ContentPoint],
    target_words: usize,
    chunk: Option<&ChunkInfo>,
    references: Option<&ReferenceContext>,
    policy: &ExpansionPolicy,
) -> String {
    let input = ExpansionInput {
        document: document.to_string(),
        content_points: content_points.to_vec(),
        target_words,
        chunk: chunk.cloned(),
        references: references.cloned(),
    };

    ExpansionEngine::new(provider, policy.clone())
        .expand(&input)
        .await
        .document
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::mock::MockProvider;
    use std::sync::Arc;

    fn points(titles: &[&str]) -> Vec<ContentPoint> {
        titles.iter().map(|t| ContentPoint::new(*t)).collect()
    }

    fn words(n: usize) -> String {
        (0..n)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn count_headings(text: &str, title: &str) -> usize {
        Document::parse(text)
            .sections()
            .iter()
            .filter(|s| s.title == title)
            .count()
    }

    fn input(document: &str, titles: &[&str], target_words: usize) -> ExpansionInput {
        ExpansionInput {
            document: document.to_string(),
            content_points: points(titles),
            target_words,
            ..ExpansionInput::default()
        }
    }

    #[tokio::test]
    async fn test_sufficient_document_unchanged() {
        let mock = Arc::new(MockProvider::replying("### Extra\nText."));
        let doc = format!("### Intro\n{}\n", words(120));

        let result = expand_short_document(
            mock.clone(),
            &doc,
            &points(&["Intro"]),
            100,
            None,
            None,
            &ExpansionPolicy::default(),
        )
        .await;

        assert_eq!(result, doc);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_concrete_scenario() {
        let conclusion = format!("### Conclusion\n{}", words(300));
        let mock = Arc::new(MockProvider::replying(conclusion));
        let engine = ExpansionEngine::new(mock.clone(), ExpansionPolicy::default());

        let report = engine
            .expand(&input("### Intro\nHello.", &["Intro", "Conclusion"], 500))
            .await;

        assert_eq!(report.outcome, ExpansionOutcome::Merged);
        assert_eq!(report.analysis.words_needed, 497);
        assert!(
            report
                .analysis
                .gaps
                .iter()
                .any(|g| g.kind == GapKind::MissingSection && g.title == "Conclusion")
        );
        assert_eq!(count_headings(&report.document, "Intro"), 1);
        assert_eq!(count_headings(&report.document, "Conclusion"), 1);
        assert!(report.document.find("### Intro") < report.document.find("### Conclusion"));

        assert_eq!(mock.calls(), 1);
        let prompt = mock.last_prompt().unwrap_or_default();
        assert!(prompt.contains("<CURRENT_SCRIPT>\n### Intro\nHello.\n</CURRENT_SCRIPT>"));
    }

    #[tokio::test]
    async fn test_generation_failure_returns_original() {
        let mock = Arc::new(MockProvider::failing("connection refused"));
        let doc = "### Intro\nHello.";

        let report = ExpansionEngine::new(mock.clone(), ExpansionPolicy::default())
            .expand(&input(doc, &["Intro", "Outro"], 500))
            .await;

        assert_eq!(report.outcome, ExpansionOutcome::GenerationFailed);
        assert_eq!(report.document, doc);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_returns_original() {
        let mock = Arc::new(MockProvider::slow(
            Duration::from_millis(500),
            "### Outro\nBye.",
        ));
        let doc = "### Intro\nHello.";

        let report = ExpansionEngine::new(mock, ExpansionPolicy::default())
            .with_timeout(Duration::from_millis(20))
            .expand(&input(doc, &["Intro", "Outro"], 500))
            .await;

        assert_eq!(report.outcome, ExpansionOutcome::GenerationFailed);
        assert_eq!(report.document, doc);
    }

    #[tokio::test]
    async fn test_no_gaps_found() {
        let mock = Arc::new(MockProvider::replying("### Extra\nText."));
        let doc = format!(
            "### Intro\n{}\n\n## Description\nAbout.\n\n## Tags\na, b\n",
            words(170)
        );

        let report = ExpansionEngine::new(mock.clone(), ExpansionPolicy::default())
            .expand(&input(&doc, &["Intro"], 210))
            .await;

        assert_eq!(report.outcome, ExpansionOutcome::NoGapsFound);
        assert_eq!(report.document, doc);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_terminal_chunk_gets_both_blocks() {
        let mock = Arc::new(MockProvider::replying(
            "## Tags\nai, tutorials, video\n\n## Description\nA closing summary.",
        ));
        let doc = format!("### Intro\n{}\n", words(200));
        let chunk = ChunkInfo {
            chunk_number: 3,
            total_chunks: 3,
            start_time: "10:00".to_string(),
            end_time: "15:00".to_string(),
            is_first: false,
            is_last: true,
            previously_covered_sections: vec!["Setup".to_string()],
        };
        let input = ExpansionInput {
            chunk: Some(chunk),
            ..input(&doc, &["Setup", "Intro"], 500)
        };

        let report = ExpansionEngine::new(mock.clone(), ExpansionPolicy::default())
            .expand(&input)
            .await;

        let critical: Vec<_> = report
            .analysis
            .gaps
            .iter()
            .filter(|g| g.priority == GapPriority::Critical)
            .map(|g| g.kind)
            .collect();
        assert_eq!(
            critical,
            vec![
                GapKind::MissingMajorBlock(MajorBlock::Description),
                GapKind::MissingMajorBlock(MajorBlock::Tags),
            ]
        );
        assert!(report.analysis.gaps.iter().all(|g| g.title != "Setup"));

        let merged = Document::parse(&report.document);
        let blocks: Vec<_> = merged
            .sections()
            .iter()
            .filter_map(|s| s.major_block())
            .collect();
        assert_eq!(blocks, vec![MajorBlock::Description, MajorBlock::Tags]);
        assert_eq!(
            merged.sections().last().and_then(|s| s.major_block()),
            Some(MajorBlock::Tags)
        );

        let prompt = mock.last_prompt().unwrap_or_default();
        assert!(prompt.contains("FINAL chunk"));
        assert!(prompt.contains("- Setup"));
    }

    #[tokio::test]
    async fn test_non_terminal_chunk_skips_blocks() {
        let mock = Arc::new(MockProvider::replying("### Outro\nBye."));
        let chunk = ChunkInfo {
            chunk_number: 1,
            total_chunks: 3,
            start_time: "00:00".to_string(),
            end_time: "05:00".to_string(),
            is_first: true,
            is_last: false,
            previously_covered_sections: Vec::new(),
        };
        let input = ExpansionInput {
            chunk: Some(chunk),
            ..input("### Intro\nHello.", &["Intro", "Outro"], 500)
        };

        let report = ExpansionEngine::new(mock, ExpansionPolicy::default())
            .expand(&input)
            .await;

        assert!(
            report
                .analysis
                .gaps
                .iter()
                .all(|g| !matches!(g.kind, GapKind::MissingMajorBlock(_)))
        );
        assert_eq!(report.outcome, ExpansionOutcome::Merged);
        assert!(!report.document.contains("## Tags"));
    }

    #[tokio::test]
    async fn test_request_params_follow_config() {
        let mock = Arc::new(MockProvider::replying("### Outro\nBye."));
        let mut config = Config::default();
        config.llm.temperature = 0.2;
        config.expansion.max_output_tokens = 1000;

        ExpansionEngine::from_config(mock.clone(), &config)
            .expand(&input("### Intro\nHello.", &["Intro", "Outro"], 2000))
            .await;

        let params = mock.last_params().unwrap();
        assert_eq!(params.model, "mock-model");
        assert_eq!(params.max_output_tokens, 1000);
        assert!((params.temperature - 0.2).abs() < f32::EPSILON);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn sufficient_documents_are_byte_identical(
                body in "[a-z]{1,8}( [a-z]{1,8}){0,60}",
                slack in 0usize..20,
            ) {
                let doc = format!("### Intro\n{}\n", body);
                let target = word_count(&doc).saturating_sub(slack);
                let mock = Arc::new(MockProvider::replying("### Extra\nText."));

                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .unwrap();
                let result = runtime.block_on(expand_short_document(
                    mock.clone(),
                    &doc,
                    &points(&["Intro", "Outro"]),
                    target,
                    None,
                    None,
                    &ExpansionPolicy::default(),
                ));

                prop_assert_eq!(result, doc);
                prop_assert_eq!(mock.calls(), 0);
            }
        }
    }
}
