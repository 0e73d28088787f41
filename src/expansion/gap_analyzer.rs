//! Gap Analyzer
//!
//! Compares a script against its word target and required content points
//! and produces a prioritized list of typed gaps.

use tracing::{debug, info};

use super::document::{Document, MajorBlock, normalize_title, word_count};
use super::types::{ChunkInfo, ContentPoint, Gap, GapAnalysis, GapKind, GapPriority};
use crate::config::ExpansionPolicy;

/// Analyze with the default policy
pub fn analyze_gaps(
    document: &str,
    content_points: &[ContentPoint],
    target_words: usize,
    chunk: Option<&ChunkInfo>,
) -> GapAnalysis {
    GapAnalyzer::default().analyze(document, content_points, target_words, chunk)
}

#[derive(Debug, Clone, Default)]
pub struct GapAnalyzer {
    policy: ExpansionPolicy,
}

impl GapAnalyzer {
    pub fn new(policy: ExpansionPolicy) -> Self {
        Self { policy }
    }

    pub fn analyze(
        &self,
        document: &str,
        content_points: &[ContentPoint],
        target_words: usize,
        chunk: Option<&ChunkInfo>,
    ) -> GapAnalysis {
        let mut analysis = GapAnalysis::new(word_count(document), target_words);

        if analysis.is_sufficient() {
            debug!(
                "Document has {} words, target {}: nothing to expand",
                analysis.current_words, target_words
            );
            return analysis;
        }

        let doc = Document::parse(document);
        let mut gaps = self.content_point_gaps(&doc, content_points, target_words, chunk);

        // Closing blocks only belong to the final chunk; no chunk means a whole document.
        if chunk.is_none_or(|c| c.is_last) {
            gaps.extend(self.major_block_gaps(&doc));
        }

        if gaps.is_empty() && analysis.words_needed > self.policy.general_expansion_min_words as i64
        {
            gaps.push(self.shortfall_gap(&doc, analysis.words_needed as usize));
        }

        gaps.sort_by_key(|g| g.priority);

        info!(
            "Gap analysis: {}/{} words, {} needed, {} gaps",
            analysis.current_words,
            target_words,
            analysis.words_needed,
            gaps.len()
        );
        for gap in &gaps {
            debug!(
                "  [{}] {} '{}' (~{} words)",
                gap.priority, gap.kind, gap.title, gap.estimated_words
            );
        }

        analysis.gaps = gaps;
        analysis
    }

    fn content_point_gaps(
        &self,
        doc: &Document,
        content_points: &[ContentPoint],
        target_words: usize,
        chunk: Option<&ChunkInfo>,
    ) -> Vec<Gap> {
        if content_points.is_empty() {
            return Vec::new();
        }

        let expected_words = target_words / content_points.len();
        let threshold = expected_words as f64 * self.policy.underdeveloped_threshold;
        let point_titles: Vec<String> = content_points
            .iter()
            .map(|p| normalize_title(&p.title))
            .collect();
        let mut gaps = Vec::new();

        for point in content_points {
            let title = point.title.trim();
            if title.is_empty() {
                continue;
            }
            if chunk.is_some_and(|c| c.covers(title)) {
                debug!("Skipping '{}': covered by an earlier chunk", title);
                continue;
            }

            match locate_point(doc, title, &point_titles) {
                None => gaps.push(
                    Gap::new(
                        GapKind::MissingSection,
                        title,
                        GapPriority::High,
                        expected_words,
                    )
                    .with_description(point.description_or_empty()),
                ),
                Some(index) => {
                    let section_words = doc.span_word_count(index);
                    if (section_words as f64) < threshold {
                        gaps.push(
                            Gap::new(
                                GapKind::UnderdevelopedSection,
                                title,
                                GapPriority::Medium,
                                threshold.round() as usize,
                            )
                            .with_description(point.description_or_empty()),
                        );
                    }
                }
            }
        }

        gaps
    }

    fn major_block_gaps(&self, doc: &Document) -> Vec<Gap> {
        [
            (
                MajorBlock::Description,
                self.policy.description_block_words,
                "Closing description that summarizes the whole script",
            ),
            (
                MajorBlock::Tags,
                self.policy.tags_block_words,
                "Flat comma-separated list of tags",
            ),
        ]
        .into_iter()
        .filter(|(block, _, _)| !doc.has_major(*block))
        .map(|(block, words, description)| {
            Gap::new(
                GapKind::MissingMajorBlock(block),
                block.title(),
                GapPriority::Critical,
                words,
            )
            .with_description(description)
        })
        .collect()
    }

    fn shortfall_gap(&self, doc: &Document, words_needed: usize) -> Gap {
        let sections = doc.minor_count();
        if sections > 0 {
            Gap::new(
                GapKind::GeneralExpansion,
                "Existing sections",
                GapPriority::Low,
                words_needed,
            )
            .with_description(format!(
                "Deepen each of the {} existing sections",
                sections
            ))
            .with_section_count(sections)
        } else {
            Gap::new(
                GapKind::ContentExpansion,
                "Whole document",
                GapPriority::Low,
                words_needed,
            )
            .with_description("Extend the document as a whole")
        }
    }
}

/// Section for a content point. A "Title: subtitle" heading that is itself
/// the exact title of another point belongs to that point only.
fn locate_point(doc: &Document, title: &str, point_titles: &[String]) -> Option<usize> {
    let index = doc.find_minor(title)?;
    let heading = normalize_title(&doc.sections()[index].title);
    if heading != normalize_title(title) && point_titles.contains(&heading) {
        return None;
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(titles: &[&str]) -> Vec<ContentPoint> {
        titles.iter().map(|t| ContentPoint::new(*t)).collect()
    }

    fn chunk(is_last: bool, covered: &[&str]) -> ChunkInfo {
        ChunkInfo {
            chunk_number: if is_last { 3 } else { 1 },
            total_chunks: 3,
            start_time: "00:00".to_string(),
            end_time: "05:00".to_string(),
            is_first: !is_last,
            is_last,
            previously_covered_sections: covered.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn filler(words: usize) -> String {
        vec!["word"; words].join(" ")
    }

    fn closed(body: &str) -> String {
        format!("{}\n\n## Description\nAbout it.\n\n## Tags\na, b\n", body)
    }

    #[test]
    fn test_sufficient_document_has_no_gaps() {
        let doc = format!("### Intro\n{}", filler(600));
        let analysis = analyze_gaps(&doc, &points(&["Intro", "Outro"]), 500, None);

        assert!(analysis.gaps.is_empty());
        assert!(analysis.words_needed <= 0);
        assert_eq!(
            analysis.words_needed,
            analysis.target_words as i64 - analysis.current_words as i64
        );
    }

    #[test]
    fn test_zero_target_short_circuits() {
        let analysis = analyze_gaps("", &[], 0, None);
        assert_eq!(analysis.words_needed, 0);
        assert!(analysis.gaps.is_empty());
    }

    #[test]
    fn test_intro_conclusion_scenario() {
        let analysis = analyze_gaps(
            "### Intro\nHello.",
            &points(&["Intro", "Conclusion"]),
            500,
            None,
        );

        assert_eq!(analysis.current_words, 3);
        assert_eq!(analysis.words_needed, 497);

        let kinds: Vec<_> = analysis
            .gaps
            .iter()
            .map(|g| (g.kind, g.title.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (GapKind::MissingMajorBlock(MajorBlock::Description), "Description"),
                (GapKind::MissingMajorBlock(MajorBlock::Tags), "Tags"),
                (GapKind::MissingSection, "Conclusion"),
                (GapKind::UnderdevelopedSection, "Intro"),
            ]
        );

        let conclusion = &analysis.gaps[2];
        assert_eq!(conclusion.priority, GapPriority::High);
        assert_eq!(conclusion.estimated_words, 250);

        let intro = &analysis.gaps[3];
        assert_eq!(intro.priority, GapPriority::Medium);
        assert_eq!(intro.estimated_words, 100);
    }

    #[test]
    fn test_terminal_chunk_reports_critical_blocks() {
        let doc = format!("### Intro\n{}", filler(200));
        let analysis = analyze_gaps(&doc, &points(&["Intro"]), 400, Some(&chunk(true, &[])));

        let critical: Vec<_> = analysis
            .gaps
            .iter()
            .filter(|g| g.priority == GapPriority::Critical)
            .collect();
        assert_eq!(critical.len(), 2);
        assert_eq!(critical[0].estimated_words, 150);
        assert_eq!(critical[1].estimated_words, 50);
        assert_eq!(analysis.gaps[0].priority, GapPriority::Critical);
    }

    #[test]
    fn test_non_terminal_chunk_skips_major_blocks() {
        let doc = format!("### Intro\n{}", filler(20));
        let analysis = analyze_gaps(&doc, &points(&["Intro"]), 400, Some(&chunk(false, &[])));

        assert!(
            analysis
                .gaps
                .iter()
                .all(|g| !matches!(g.kind, GapKind::MissingMajorBlock(_)))
        );
        assert_eq!(analysis.gaps[0].kind, GapKind::UnderdevelopedSection);
    }

    #[test]
    fn test_previously_covered_sections_are_skipped() {
        let analysis = analyze_gaps(
            "### Body\nShort.",
            &points(&["Intro", "Body", "Outro"]),
            900,
            Some(&chunk(false, &["intro"])),
        );

        let titles: Vec<_> = analysis.gaps.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Outro", "Body"]);
    }

    #[test]
    fn test_prose_mention_is_not_a_section() {
        let doc = closed(&format!("### Intro\nToday we cover the Pricing model. {}", filler(300)));
        let analysis = analyze_gaps(&doc, &points(&["Intro", "Pricing"]), 700, None);

        assert_eq!(analysis.gaps.len(), 1);
        assert_eq!(analysis.gaps[0].kind, GapKind::MissingSection);
        assert_eq!(analysis.gaps[0].title, "Pricing");
    }

    #[test]
    fn test_overlapping_titles_are_distinct() {
        let doc = closed(&format!("### Initial Setup\n{}", filler(200)));
        let analysis = analyze_gaps(&doc, &points(&["Initial Setup", "Setup"]), 500, None);

        assert_eq!(analysis.gaps.len(), 1);
        assert_eq!(analysis.gaps[0].title, "Setup");
        assert_eq!(analysis.gaps[0].kind, GapKind::MissingSection);
    }

    #[test]
    fn test_longer_heading_does_not_satisfy_shorter_point() {
        let doc = closed(&format!("### Setup Advanced\n{}", filler(20)));
        let analysis = analyze_gaps(&doc, &points(&["Setup", "Setup Advanced"]), 500, None);

        let kinds: Vec<_> = analysis
            .gaps
            .iter()
            .map(|g| (g.kind, g.title.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (GapKind::MissingSection, "Setup"),
                (GapKind::UnderdevelopedSection, "Setup Advanced"),
            ]
        );
    }

    #[test]
    fn test_subtitled_heading_owned_by_its_own_point() {
        let doc = closed(&format!("### Setup: Advanced\n{}", filler(200)));
        let analysis = analyze_gaps(&doc, &points(&["Setup", "Setup: Advanced"]), 500, None);

        assert_eq!(analysis.gaps.len(), 1);
        assert_eq!(analysis.gaps[0].kind, GapKind::MissingSection);
        assert_eq!(analysis.gaps[0].title, "Setup");
    }

    #[test]
    fn test_document_title_does_not_count_as_description() {
        let analysis = analyze_gaps(
            "# Weekly Tech Summary\n\n### Intro\nHello.\n",
            &points(&["Intro", "Outro"]),
            500,
            None,
        );

        let kinds: Vec<_> = analysis.gaps.iter().map(|g| g.kind).collect();
        assert_eq!(
            kinds,
            vec![
                GapKind::MissingMajorBlock(MajorBlock::Description),
                GapKind::MissingMajorBlock(MajorBlock::Tags),
                GapKind::MissingSection,
                GapKind::UnderdevelopedSection,
            ]
        );
    }

    #[test]
    fn test_general_expansion_fallback() {
        let doc = closed(&format!(
            "### Intro\n{}\n\n### Outro\n{}",
            filler(100),
            filler(100)
        ));
        let analysis = analyze_gaps(&doc, &points(&["Intro", "Outro"]), 400, None);

        assert_eq!(analysis.gaps.len(), 1);
        let gap = &analysis.gaps[0];
        assert_eq!(gap.kind, GapKind::GeneralExpansion);
        assert_eq!(gap.section_count, Some(2));
        assert_eq!(gap.estimated_words as i64, analysis.words_needed);
    }

    #[test]
    fn test_content_expansion_without_sections() {
        let doc = closed(&filler(100));
        let analysis = analyze_gaps(&doc, &[], 400, None);

        assert_eq!(analysis.gaps.len(), 1);
        assert_eq!(analysis.gaps[0].kind, GapKind::ContentExpansion);
        assert_eq!(analysis.gaps[0].section_count, None);
    }

    #[test]
    fn test_small_deficit_yields_no_fallback() {
        let doc = closed(&format!("### Intro\n{}", filler(170)));
        let analysis = analyze_gaps(&doc, &points(&["Intro"]), 220, None);

        assert!(analysis.words_needed > 0);
        assert!(analysis.gaps.is_empty());
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let analysis = analyze_gaps(
            "",
            &points(&["Alpha", "Beta", "Gamma"]),
            900,
            Some(&chunk(false, &[])),
        );
        let titles: Vec<_> = analysis.gaps.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_missing_description_is_empty_string() {
        let points = vec![
            ContentPoint::new("Intro").with_description("Hook the viewer"),
            ContentPoint::new("Outro"),
        ];
        let analysis = analyze_gaps("", &points, 400, Some(&chunk(false, &[])));

        assert_eq!(analysis.gaps[0].description, "Hook the viewer");
        assert_eq!(analysis.gaps[1].description, "");
    }

    #[test]
    fn test_threshold_is_configurable() {
        let doc = closed(&format!("### Intro\n{}", filler(90)));
        let strict = GapAnalyzer::new(ExpansionPolicy {
            underdeveloped_threshold: 0.5,
            ..ExpansionPolicy::default()
        });

        // Fair share is 200: 40% => 80 words, 50% => 100 words.
        let default_gaps = analyze_gaps(&doc, &points(&["Intro"]), 200, None);
        let strict_gaps = strict.analyze(&doc, &points(&["Intro"]), 200, None);

        assert!(
            default_gaps
                .gaps
                .iter()
                .all(|g| g.kind != GapKind::UnderdevelopedSection)
        );
        assert_eq!(strict_gaps.gaps.len(), 1);
        assert_eq!(strict_gaps.gaps[0].kind, GapKind::UnderdevelopedSection);
        assert_eq!(strict_gaps.gaps[0].estimated_words, 100);
    }
}
