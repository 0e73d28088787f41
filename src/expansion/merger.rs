//! Document Merger
//!
//! Splices generated content into the original script without ever emitting
//! a second heading for a title that already exists.
//!
//! ## Strategies
//!
//! 1. **Headed**: expansion opens with a mandatory block heading; every piece
//!    goes through the duplicate-safe routine.
//! 2. **Section-wide**: a general/content expansion gap is present; pieces are
//!    matched to existing sections by title, unmatched pieces and bare text go
//!    before the mandatory blocks.
//! 3. **Targeted** (default): the top gaps consume their pieces in order;
//!    anything left over falls back to the duplicate-safe routine.

use tracing::{debug, info};

use super::document::{Document, MAJOR_LEVEL, MINOR_LEVEL, MajorBlock, Section, titles_match, word_count};
use super::types::{Gap, GapAnalysis, GapKind};
use crate::config::ExpansionPolicy;

/// Merge with the default policy
pub fn merge_expansion(document: &str, expansion: Option<&str>, analysis: &GapAnalysis) -> String {
    DocumentMerger::default().merge(document, expansion, analysis)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeStrategy {
    Headed,
    SectionWide,
    Targeted,
}

/// One headed chunk of generated text
#[derive(Debug, Clone)]
struct Piece {
    title: String,
    major: Option<MajorBlock>,
    body: String,
}

/// Generated text split on heading boundaries
#[derive(Debug, Default)]
struct Pieces {
    lead: String,
    headed: Vec<Piece>,
}

impl Pieces {
    /// Split on major/minor headings; deeper headings stay inside their piece
    fn split(expansion: &str) -> Self {
        let parsed = Document::parse(expansion);
        let mut pieces = Pieces {
            lead: parsed.preamble().trim().to_string(),
            headed: Vec::new(),
        };

        for section in parsed.sections() {
            match pieces.headed.last_mut() {
                Some(last) if section.level > MINOR_LEVEL => {
                    last.body.push_str(section.heading_line().trim_end());
                    last.body.push('\n');
                    last.body.push_str(&section.body);
                }
                _ => pieces.headed.push(Piece {
                    title: section.title.clone(),
                    major: section.major_block(),
                    body: section.body.clone(),
                }),
            }
        }

        for piece in &mut pieces.headed {
            piece.body = piece.body.trim().to_string();
        }
        pieces
    }

    fn take_lead(&mut self) -> Option<String> {
        if self.lead.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.lead))
        }
    }

    fn take_major(&mut self, block: MajorBlock) -> Option<Piece> {
        let index = self.headed.iter().position(|p| p.major == Some(block))?;
        Some(self.headed.remove(index))
    }

    fn take_minor(&mut self, title: &str) -> Option<Piece> {
        let index = self
            .headed
            .iter()
            .position(|p| p.major.is_none() && titles_match(&p.title, title))?;
        Some(self.headed.remove(index))
    }

    fn starts_with_major_block(&self) -> bool {
        self.lead.is_empty() && self.headed.first().is_some_and(|p| p.major.is_some())
    }
}

#[derive(Debug, Clone)]
pub struct DocumentMerger {
    max_gaps: usize,
}

impl Default for DocumentMerger {
    fn default() -> Self {
        Self::new(&ExpansionPolicy::default())
    }
}

impl DocumentMerger {
    pub fn new(policy: &ExpansionPolicy) -> Self {
        Self {
            max_gaps: policy.max_gaps_per_request,
        }
    }

    /// Merge `expansion` into `document`; blank or absent expansion is a no-op
    pub fn merge(&self, document: &str, expansion: Option<&str>, analysis: &GapAnalysis) -> String {
        let Some(expansion) = expansion.map(str::trim).filter(|e| !e.is_empty()) else {
            return document.to_string();
        };

        let mut doc = Document::parse(document);
        let mut pieces = Pieces::split(expansion);

        let strategy = if pieces.starts_with_major_block() {
            MergeStrategy::Headed
        } else if analysis.has_document_wide_gap() {
            MergeStrategy::SectionWide
        } else {
            MergeStrategy::Targeted
        };
        debug!(
            "Merging {} pieces ({} lead words) with {:?} strategy",
            pieces.headed.len(),
            word_count(&pieces.lead),
            strategy
        );

        if strategy == MergeStrategy::Targeted {
            merge_targeted(&mut doc, &mut pieces, analysis.top_gaps(self.max_gaps));
        }
        merge_remaining(&mut doc, pieces);

        if doc.move_tags_to_end() {
            debug!("Moved tags block to the end");
        }

        let merged = doc.render();
        info!(
            "Merged expansion: {} -> {} words",
            word_count(document),
            word_count(&merged)
        );
        merged
    }
}

fn merge_targeted(doc: &mut Document, pieces: &mut Pieces, gaps: &[Gap]) {
    for gap in gaps {
        match gap.kind {
            GapKind::MissingMajorBlock(block) => match pieces.take_major(block) {
                Some(piece) => merge_major(doc, block, &piece.title, &piece.body),
                None => debug!("No generated content for '{}' block", block),
            },
            GapKind::UnderdevelopedSection => {
                let Some(body) = pieces
                    .take_minor(&gap.title)
                    .map(|p| p.body)
                    .or_else(|| pieces.take_lead())
                else {
                    debug!("No generated content for '{}'", gap.title);
                    continue;
                };

                if let Some(index) = doc.find_minor(&gap.title) {
                    doc.append_to_span(index, &body);
                } else if !doc.insert_after_phrase(&gap.title, &body) {
                    let at = doc.content_insertion_point();
                    doc.insert_text_before(at, &body);
                }
            }
            GapKind::MissingSection => {
                let (title, body) = match pieces.take_minor(&gap.title) {
                    Some(piece) => (piece.title, piece.body),
                    None => match pieces.take_lead() {
                        Some(lead) => (gap.title.clone(), lead),
                        None => {
                            debug!("No generated content for '{}'", gap.title);
                            continue;
                        }
                    },
                };

                match doc.find_minor(&gap.title) {
                    Some(index) => {
                        doc.append_to_span(index, &body);
                    }
                    None => {
                        let at = doc.content_insertion_point();
                        doc.insert_section(at, Section::new(MINOR_LEVEL, &title, &body));
                    }
                }
            }
            // Document-wide gaps never reach the targeted strategy
            GapKind::GeneralExpansion | GapKind::ContentExpansion => {}
        }
    }
}

/// Duplicate-safe routine for every piece no gap consumed
fn merge_remaining(doc: &mut Document, mut pieces: Pieces) {
    if let Some(lead) = pieces.take_lead() {
        let at = doc.content_insertion_point();
        doc.insert_text_before(at, &lead);
    }

    for piece in pieces.headed {
        match piece.major {
            Some(block) => merge_major(doc, block, &piece.title, &piece.body),
            None => match doc.find_minor(&piece.title) {
                Some(index) => {
                    doc.append_to_span(index, &piece.body);
                }
                None => {
                    let at = doc.content_insertion_point();
                    doc.insert_section(at, Section::new(MINOR_LEVEL, &piece.title, &piece.body));
                }
            },
        }
    }
}

/// Tags go last; description goes right before tags, else last
fn merge_major(doc: &mut Document, block: MajorBlock, title: &str, body: &str) {
    if let Some(index) = doc.find_major(block) {
        doc.append_to_span(index, body);
        return;
    }

    let section = Section::new(MAJOR_LEVEL, title, body);
    match (block, doc.find_major(MajorBlock::Tags)) {
        (MajorBlock::Description, Some(tags)) => doc.insert_section(tags, section),
        _ => doc.push_section(section),
    }
}
