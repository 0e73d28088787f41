//! Expansion Prompt Builder
//!
//! Turns the top-priority gaps into one generation request: the full current
//! script as immutable context, one instruction per gap, formatting rules,
//! chunk scoping and optional reference snippets.

use tracing::debug;

use super::document::{MINOR_LEVEL, MajorBlock};
use super::types::{ChunkInfo, Gap, GapAnalysis, GapKind, GenerationRequest, ReferenceContext};
use crate::ai::provider::GenerationParams;
use crate::ai::prompt::PromptTemplates;
use crate::config::{ExpansionPolicy, LlmConfig};
use crate::constants::{markup, request};

#[derive(Debug, Clone)]
pub struct ExpansionPromptBuilder {
    policy: ExpansionPolicy,
    model: String,
    temperature: f32,
}

impl Default for ExpansionPromptBuilder {
    fn default() -> Self {
        Self::new(ExpansionPolicy::default())
    }
}

impl ExpansionPromptBuilder {
    pub fn new(policy: ExpansionPolicy) -> Self {
        let llm = LlmConfig::default();
        Self {
            policy,
            model: llm.model,
            temperature: llm.temperature,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>, temperature: f32) -> Self {
        self.model = model.into();
        self.temperature = temperature;
        self
    }

    pub fn build(
        &self,
        document: &str,
        analysis: &GapAnalysis,
        chunk: Option<&ChunkInfo>,
        references: Option<&ReferenceContext>,
    ) -> GenerationRequest {
        let gaps = analysis.top_gaps(self.policy.max_gaps_per_request);
        let budgets = budgets(gaps, analysis.words_needed);
        let word_target: usize = budgets.iter().sum();

        let script = if document.trim().is_empty() {
            "(the script is empty so far)"
        } else {
            document
        };

        let mut builder = PromptTemplates::script_extension(word_target)
            .delimited("CURRENT_SCRIPT", script)
            .section(
                "Task",
                &format!(
                    "The script above is {} words long and must reach {} words. \
                     Write ONLY the new content described below.",
                    analysis.current_words, analysis.target_words
                ),
            )
            .objectives(
                gaps.iter()
                    .zip(&budgets)
                    .map(|(gap, words)| gap_instruction(gap, *words)),
            )
            .section(
                "Word Target",
                &format!(
                    "Total new content: AT LEAST {} words. This is a hard requirement; \
                     short output is unacceptable.",
                    word_target
                ),
            )
            .bullets("Formatting Rules", formatting_rules());

        if let Some(chunk) = chunk {
            builder = builder
                .section("Chunk Scope", &chunk_scope(chunk))
                .bullets(
                    "Already Covered (do NOT write these again)",
                    chunk.previously_covered_sections.iter().cloned(),
                );
        }

        if let Some(references) = references {
            builder = builder.bullets(
                "Supporting References",
                references
                    .sources
                    .iter()
                    .take(self.policy.max_reference_snippets)
                    .map(|source| {
                        format!(
                            "{}: {}",
                            source.title.trim(),
                            truncate_chars(source.excerpt.trim(), request::MAX_REFERENCE_EXCERPT_CHARS)
                        )
                    }),
            );
        }

        let prompt_text = builder.build();
        let max_output_tokens = self.output_tokens(word_target);

        debug!(
            "Expansion prompt: {} gaps, {} words target, {} max tokens, {} chars",
            gaps.len(),
            word_target,
            max_output_tokens,
            prompt_text.len()
        );

        GenerationRequest {
            prompt_text,
            word_target,
            model_params: GenerationParams {
                model: self.model.clone(),
                max_output_tokens,
                temperature: self.temperature,
            },
        }
    }

    /// Output-size parameter scaled from the word target
    pub fn output_tokens(&self, word_target: usize) -> usize {
        let scaled = (word_target as f64 * self.policy.tokens_per_word).ceil() as usize;
        scaled.clamp(self.policy.min_output_tokens, self.policy.max_output_tokens)
    }
}

/// Per-gap budgets; gaps without their own estimate share the deficit evenly
fn budgets(gaps: &[Gap], words_needed: i64) -> Vec<usize> {
    let share = if gaps.is_empty() {
        0
    } else {
        words_needed.max(0) as usize / gaps.len()
    };

    gaps.iter()
        .map(|gap| {
            if gap.estimated_words > 0 {
                gap.estimated_words
            } else {
                share
            }
        })
        .collect()
}

fn gap_instruction(gap: &Gap, words: usize) -> String {
    let minor = markup::MINOR_HEADING;
    let mut instruction = match gap.kind {
        GapKind::MissingSection => format!(
            "Create the missing section \"{minor} {}\" from scratch (about {words} words).",
            gap.title
        ),
        GapKind::UnderdevelopedSection => format!(
            "Expand the existing section \"{}\" with about {words} NEW words. Put the additions \
             under \"{minor} {}\"; they are appended to that section, so do NOT repeat its \
             existing content.",
            gap.title, gap.title
        ),
        GapKind::MissingMajorBlock(MajorBlock::Description) => format!(
            "Write the closing \"{}\" block (about {words} words) summarizing the whole script.",
            MajorBlock::Description.heading()
        ),
        GapKind::MissingMajorBlock(MajorBlock::Tags) => format!(
            "Write the \"{}\" block as the very last block (about {words} words of tags).",
            MajorBlock::Tags.heading()
        ),
        GapKind::GeneralExpansion => {
            let sections = gap.section_count.unwrap_or(1).max(1);
            format!(
                "Expand each of the {sections} existing sections by about {} words \
                 ({words} words in total). Label each addition with that section's existing \
                 \"{minor}\" heading.",
                words / sections
            )
        }
        GapKind::ContentExpansion => format!(
            "Extend the script as a whole with about {words} words of new content that \
             continues naturally from where it ends."
        ),
    };

    let description = gap.description.trim();
    if !description.is_empty() {
        instruction.push_str(" Focus: ");
        instruction.push_str(description);
    }
    instruction
}

fn formatting_rules() -> Vec<String> {
    vec![
        format!(
            "Only two blocks use \"{}\": \"{}\" and \"{}\"",
            markup::MAJOR_HEADING,
            MajorBlock::Description.heading(),
            MajorBlock::Tags.heading()
        ),
        format!(
            "Every other new section uses \"{}\" (level {})",
            markup::MINOR_HEADING,
            MINOR_LEVEL
        ),
        format!(
            "\"{}\" content is one flat comma-separated list, e.g. \"ai, productivity, tutorial\"",
            MajorBlock::Tags.heading()
        ),
        "Never use placeholder brackets such as [tag] or [topic]".to_string(),
    ]
}

fn chunk_scope(chunk: &ChunkInfo) -> String {
    let mut text = format!(
        "This is chunk {} of {}, covering {} to {}.",
        chunk.chunk_number, chunk.total_chunks, chunk.start_time, chunk.end_time
    );
    if chunk.is_last {
        text.push_str(&format!(
            " This is the FINAL chunk: it MUST include both the \"{}\" and \"{}\" blocks, \
             with \"{}\" last.",
            MajorBlock::Description.heading(),
            MajorBlock::Tags.heading(),
            MajorBlock::Tags.heading()
        ));
    } else {
        text.push_str(&format!(
            " This is NOT the final chunk: do not write \"{}\" or \"{}\" blocks.",
            MajorBlock::Description.heading(),
            MajorBlock::Tags.heading()
        ));
    }
    text
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
