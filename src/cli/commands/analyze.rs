//! Analyze Command
//!
//! Prints the gap analysis for a script without calling any provider.

use crate::cli::commands::InputPaths;
use crate::config::ConfigLoader;
use crate::expansion::{GapAnalysis, GapAnalyzer};
use crate::types::Result;

pub fn run(paths: &InputPaths, format: &str) -> Result<()> {
    let config = ConfigLoader::load()?;
    let input = paths.load()?;

    let analysis = GapAnalyzer::new(config.expansion).analyze(
        &input.document,
        &input.content_points,
        input.target_words,
        input.chunk.as_ref(),
    );

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print!("{}", render_analysis(&analysis));
    }
    Ok(())
}

/// Human-readable analysis report
pub fn render_analysis(analysis: &GapAnalysis) -> String {
    let mut out = String::new();
    out.push_str("Gap Analysis\n");
    out.push_str("══════════════════════════════════════\n");
    out.push_str(&format!(
        "Words: {} / {} (needed: {})\n",
        analysis.current_words, analysis.target_words, analysis.words_needed
    ));

    if analysis.is_sufficient() {
        out.push_str("\nDocument meets its target. Nothing to expand.\n");
        return out;
    }
    if analysis.gaps.is_empty() {
        out.push_str("\nNo actionable gaps found.\n");
        return out;
    }

    out.push_str(&format!("\nGaps ({}):\n", analysis.gaps.len()));
    for gap in &analysis.gaps {
        out.push_str(&format!(
            "  [{:<8}] {:<28} {} (~{} words)\n",
            gap.priority.to_string(),
            gap.kind.to_string(),
            gap.title,
            gap.estimated_words
        ));
        if !gap.description.is_empty() {
            out.push_str(&format!("             {}\n", gap.description));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::{ContentPoint, analyze_gaps};

    #[test]
    fn test_render_lists_gaps() {
        let analysis = analyze_gaps(
            "### Intro\nHello.",
            &[ContentPoint::new("Intro"), ContentPoint::new("Conclusion")],
            500,
            None,
        );
        let text = render_analysis(&analysis);

        assert!(text.contains("Words: 3 / 500 (needed: 497)"));
        assert!(text.contains("Gaps (4):"));
        assert!(text.contains("[critical]"));
        assert!(text.contains("missing_section"));
        assert!(text.contains("Conclusion (~250 words)"));
    }

    #[test]
    fn test_render_sufficient() {
        let analysis = analyze_gaps("one two three", &[], 2, None);
        assert!(render_analysis(&analysis).contains("Nothing to expand"));
    }
}
