//! Expand Command
//!
//! Runs the expansion pipeline on a script and writes the result.
//!
//! Usage:
//!   script-expander expand --document script.md --points points.yaml --target-words 1500
//!   script-expander expand ... --chunk chunk.json --references refs.json --output out.md
//!   script-expander expand ... --dry-run

use std::path::PathBuf;

use crate::ai::provider::create_provider;
use crate::cli::commands::InputPaths;
use crate::cli::commands::analyze::render_analysis;
use crate::cli::input::write_document;
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::expansion::{ExpansionEngine, ExpansionOutcome, ExpansionPromptBuilder, GapAnalyzer};
use crate::types::Result;

#[derive(Debug, Clone, Default)]
pub struct ExpandOptions {
    pub inputs: InputPaths,
    pub output: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub dry_run: bool,
}

pub async fn run(options: ExpandOptions) -> Result<()> {
    let config = apply_overrides(ConfigLoader::load()?, &options);
    config.validate()?;
    let input = options.inputs.load()?;
    let out = Output::new();

    if options.dry_run {
        let analysis = GapAnalyzer::new(config.expansion.clone()).analyze(
            &input.document,
            &input.content_points,
            input.target_words,
            input.chunk.as_ref(),
        );
        print!("{}", render_analysis(&analysis));

        if !analysis.is_sufficient() && !analysis.gaps.is_empty() {
            let request = ExpansionPromptBuilder::new(config.expansion.clone())
                .with_model(config.llm.model.clone(), config.llm.temperature)
                .build(
                    &input.document,
                    &analysis,
                    input.chunk.as_ref(),
                    input.references.as_ref(),
                );
            println!(
                "\nRequest: {} words, max {} tokens, model {}",
                request.word_target,
                request.model_params.max_output_tokens,
                request.model_params.model
            );
            println!("──────────────────────────────────────");
            println!("{}", request.prompt_text);
        }
        return Ok(());
    }

    let provider = create_provider(&config.llm.to_provider_config())?;
    out.info(&format!(
        "Expanding with {}/{}",
        provider.name(),
        provider.model()
    ));

    let report = ExpansionEngine::from_config(provider, &config)
        .expand(&input)
        .await;

    write_document(options.output.as_deref(), &report.document)?;

    let analysis = &report.analysis;
    match report.outcome {
        ExpansionOutcome::Sufficient => out.success(&format!(
            "Already at {} of {} words, unchanged",
            analysis.current_words, analysis.target_words
        )),
        ExpansionOutcome::NoGapsFound => out.warning(&format!(
            "{} words short but no actionable gaps, unchanged",
            analysis.words_needed
        )),
        ExpansionOutcome::GenerationFailed => {
            out.warning("Generation failed, original document returned")
        }
        ExpansionOutcome::Merged => out.success(&format!(
            "Expanded {} -> {} words (target {})",
            analysis.current_words,
            crate::expansion::word_count(&report.document),
            analysis.target_words
        )),
    }
    if let Some(path) = &options.output {
        out.info(&format!("Written to {}", path.display()));
    }

    Ok(())
}

/// Command-line provider/model flags win over file and env configuration
fn apply_overrides(mut config: Config, options: &ExpandOptions) -> Config {
    if let Some(provider) = &options.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &options.model {
        config.llm.model = model.clone();
    }
    config
}
