//! Document AST
//!
//! A script is parsed once into a preamble followed by an ordered list of
//! headed sections. Every section keeps its raw heading line and raw body, so
//! rendering an unmodified document reproduces the input byte for byte.
//! Gap analysis and merging work on this structure; text is regenerated by a
//! single `render` call.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;

use crate::constants::markup;

/// Heading level used for mandatory closing blocks (`##`)
pub const MAJOR_LEVEL: usize = markup::MAJOR_HEADING.len();

/// Heading level used for content sections (`###`)
pub const MINOR_LEVEL: usize = markup::MINOR_HEADING.len();

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#{1,6})[ \t]+(.*?)[ \t#]*$").expect("heading pattern is valid")
});

static ENUMERATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+|[ivxIVX]+)[.)]\s+").expect("enumeration pattern is valid")
});

/// Whitespace-delimited token count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Canonical form used for heading comparisons.
///
/// Lowercases, drops emphasis markers, leading enumeration ("2. ") and
/// trailing punctuation, and collapses inner whitespace.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title
        .trim()
        .trim_matches(|c: char| matches!(c, '*' | '_' | '`'))
        .trim();
    let without_number = ENUMERATION_RE.replace(trimmed, "");
    let cleaned = without_number.trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, ':' | '.' | '-' | '*' | '_' | '`')
    });

    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether a heading title names the wanted section.
///
/// Exact match after normalization, or the heading starts with the wanted
/// title followed by a punctuation separator ("Intro: Welcome" and
/// "Intro - Welcome" name "Intro"). Further words alone are not a separator,
/// so "Setup", "Setup Advanced" and "Initial Setup" stay distinct.
pub fn titles_match(heading: &str, wanted: &str) -> bool {
    let heading = normalize_title(heading);
    let wanted = normalize_title(wanted);
    !wanted.is_empty() && (heading == wanted || is_prefixed_by(&heading, &wanted))
}

fn is_prefixed_by(heading: &str, wanted: &str) -> bool {
    heading
        .strip_prefix(wanted)
        .filter(|rest| rest.starts_with(|c: char| !c.is_alphanumeric()))
        .and_then(|rest| rest.trim_start().chars().next())
        .is_some_and(|c| !c.is_alphanumeric())
}

// =============================================================================
// Mandatory Major Blocks
// =============================================================================

/// The two closing blocks every finished script must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MajorBlock {
    /// Closing description / summary
    Description,
    /// Comma-separated tag list, always last
    Tags,
}

impl MajorBlock {
    /// Recognise a major heading title
    pub fn from_title(title: &str) -> Option<Self> {
        let normalized = normalize_title(title);
        if normalized.contains("tags") || normalized.contains("keywords") {
            Some(Self::Tags)
        } else if normalized.contains("description") || normalized.contains("summary") {
            Some(Self::Description)
        } else {
            None
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Description => markup::DESCRIPTION_TITLE,
            Self::Tags => markup::TAGS_TITLE,
        }
    }

    /// Full heading line, e.g. `## Tags`
    pub fn heading(&self) -> String {
        format!("{} {}", markup::MAJOR_HEADING, self.title())
    }
}

impl std::fmt::Display for MajorBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

// =============================================================================
// Section
// =============================================================================

/// One headed section: raw heading line plus the text up to the next heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: usize,
    pub title: String,
    heading: String,
    pub body: String,
}

impl Section {
    /// Build a fresh section with a canonical heading line
    pub fn new(level: usize, title: &str, body: &str) -> Self {
        let level = level.clamp(1, markup::MAX_HEADING_LEVEL);
        let title = title.trim();
        let mut section = Self {
            level,
            title: title.to_string(),
            heading: format!("{} {}\n", "#".repeat(level), title),
            body: String::new(),
        };
        section.append(body);
        section
    }

    fn parse_heading(line: &str) -> Option<(usize, String)> {
        let line = line.trim_end_matches(['\n', '\r']);
        let caps = HEADING_RE.captures(line)?;
        let title = caps.get(2)?.as_str().trim();
        if title.is_empty() {
            return None;
        }
        Some((caps.get(1)?.as_str().len(), title.to_string()))
    }

    /// Raw heading line as it appears in the document
    pub fn heading_line(&self) -> &str {
        &self.heading
    }

    pub fn is_minor(&self) -> bool {
        self.level >= MINOR_LEVEL
    }

    /// Mandatory block this section represents, if any. Only `##` headings
    /// qualify; a `#` title such as "Weekly Summary" is plain structure.
    pub fn major_block(&self) -> Option<MajorBlock> {
        if self.level == MAJOR_LEVEL {
            MajorBlock::from_title(&self.title)
        } else {
            None
        }
    }

    /// Words in heading and body
    pub fn word_count(&self) -> usize {
        word_count(&self.heading) + word_count(&self.body)
    }

    /// Append a paragraph to the end of the body. Returns false for blank text.
    pub fn append(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.seal_heading();
        append_block(&mut self.body, text)
    }

    /// Leave a blank line between this section and a following heading
    fn pad_before_heading(&mut self) {
        self.seal_heading();
        pad_before_heading(&mut self.body);
    }

    fn seal_heading(&mut self) {
        if !self.heading.ends_with('\n') {
            self.heading.push('\n');
        }
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&self.heading);
        out.push_str(&self.body);
    }
}

fn append_block(buf: &mut String, text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    let kept = buf.trim_end().len();
    buf.truncate(kept);
    if !buf.is_empty() {
        buf.push_str("\n\n");
    }
    buf.push_str(text);
    buf.push('\n');
    true
}

fn pad_before_heading(buf: &mut String) {
    if buf.trim().is_empty() || buf.ends_with("\n\n") {
        return;
    }
    let kept = buf.trim_end().len();
    buf.truncate(kept);
    buf.push_str("\n\n");
}

/// Byte offset just past the line containing `idx`
fn end_of_line(text: &str, idx: usize) -> usize {
    text[idx..]
        .find('\n')
        .map(|pos| idx + pos + 1)
        .unwrap_or(text.len())
}

fn splice_after(text: &str, at: usize, insert: &str) -> String {
    let (head, tail) = text.split_at(at);
    let mut out = String::with_capacity(text.len() + insert.len() + 4);
    out.push_str(head);
    if !head.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(insert.trim());
    out.push('\n');
    if !tail.is_empty() {
        out.push('\n');
        out.push_str(tail);
    }
    out
}

// =============================================================================
// Document
// =============================================================================

/// Parsed script: text before the first heading plus ordered sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    preamble: String,
    sections: Vec<Section>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        let mut doc = Document::default();
        let mut in_fence = false;

        for line in text.split_inclusive('\n') {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
            }

            let heading = if in_fence {
                None
            } else {
                Section::parse_heading(line)
            };

            match heading {
                Some((level, title)) => doc.sections.push(Section {
                    level,
                    title,
                    heading: line.to_string(),
                    body: String::new(),
                }),
                None => match doc.sections.last_mut() {
                    Some(section) => section.body.push_str(line),
                    None => doc.preamble.push_str(line),
                },
            }
        }

        doc
    }

    pub fn render(&self) -> String {
        let mut out = self.preamble.clone();
        for section in &self.sections {
            section.render_into(&mut out);
        }
        out
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.preamble) + self.sections.iter().map(Section::word_count).sum::<usize>()
    }

    /// Number of content (minor-heading) sections
    pub fn minor_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_minor()).count()
    }

    /// Section plus all following deeper sections
    pub fn span(&self, index: usize) -> Range<usize> {
        let level = self.sections[index].level;
        let end = self.sections[index + 1..]
            .iter()
            .position(|s| s.level <= level)
            .map(|offset| index + 1 + offset)
            .unwrap_or(self.sections.len());
        index..end
    }

    /// Words from a section heading up to the next heading of equal or higher level
    pub fn span_word_count(&self, index: usize) -> usize {
        self.sections[self.span(index)]
            .iter()
            .map(Section::word_count)
            .sum()
    }

    /// Minor section whose heading names `title`, preferring an exact match
    /// over a "Title: subtitle" heading
    pub fn find_minor(&self, title: &str) -> Option<usize> {
        let wanted = normalize_title(title);
        if wanted.is_empty() {
            return None;
        }

        let minors = || {
            self.sections
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_minor())
                .map(|(i, s)| (i, normalize_title(&s.title)))
        };
        minors()
            .find(|(_, heading)| *heading == wanted)
            .or_else(|| minors().find(|(_, heading)| is_prefixed_by(heading, &wanted)))
            .map(|(i, _)| i)
    }

    pub fn find_major(&self, block: MajorBlock) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.major_block() == Some(block))
    }

    pub fn has_major(&self, block: MajorBlock) -> bool {
        self.find_major(block).is_some()
    }

    /// Where new content goes: before the first mandatory block, else the end
    pub fn content_insertion_point(&self) -> usize {
        self.sections
            .iter()
            .position(|s| s.major_block().is_some())
            .unwrap_or(self.sections.len())
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Append text at the end of a section's span (after any subsections)
    pub fn append_to_span(&mut self, index: usize, text: &str) -> bool {
        let last = self.span(index).end - 1;
        let appended = self.sections[last].append(text);
        if appended && last + 1 < self.sections.len() {
            self.sections[last].pad_before_heading();
        }
        appended
    }

    /// Insert a section so it becomes `sections()[at]`
    pub fn insert_section(&mut self, at: usize, mut section: Section) {
        let at = at.min(self.sections.len());
        if at == 0 {
            pad_before_heading(&mut self.preamble);
        } else {
            self.sections[at - 1].pad_before_heading();
        }
        if at < self.sections.len() {
            section.pad_before_heading();
        }
        self.sections.insert(at, section);
    }

    /// Append a section at the very end
    pub fn push_section(&mut self, section: Section) {
        self.insert_section(self.sections.len(), section);
    }

    /// Insert unheaded text so it ends right before `sections()[at]`
    pub fn insert_text_before(&mut self, at: usize, text: &str) -> bool {
        let at = at.min(self.sections.len());
        let followed = at < self.sections.len();

        if at == 0 {
            let appended = append_block(&mut self.preamble, text);
            if appended && followed {
                pad_before_heading(&mut self.preamble);
            }
            appended
        } else {
            let prev = &mut self.sections[at - 1];
            let appended = prev.append(text);
            if appended && followed {
                prev.pad_before_heading();
            }
            appended
        }
    }

    /// Insert a paragraph after the line holding the first case-insensitive
    /// occurrence of `phrase`. Returns false when the phrase does not occur.
    pub fn insert_after_phrase(&mut self, phrase: &str, text: &str) -> bool {
        let needle = phrase.trim().to_ascii_lowercase();
        if needle.is_empty() || text.trim().is_empty() {
            return false;
        }

        if let Some(idx) = self.preamble.to_ascii_lowercase().find(&needle) {
            let at = end_of_line(&self.preamble, idx);
            self.preamble = splice_after(&self.preamble, at, text);
            if !self.sections.is_empty() {
                pad_before_heading(&mut self.preamble);
            }
            return true;
        }

        let count = self.sections.len();
        for (i, section) in self.sections.iter_mut().enumerate() {
            let in_heading = section.heading.to_ascii_lowercase().contains(&needle);
            let in_body = section.body.to_ascii_lowercase().find(&needle);

            if !in_heading && in_body.is_none() {
                continue;
            }

            section.seal_heading();
            let at = match in_body {
                Some(idx) if !in_heading => end_of_line(&section.body, idx),
                _ => 0,
            };
            section.body = if at == 0 && section.body.trim().is_empty() {
                format!("{}\n", text.trim())
            } else if at == 0 {
                format!("{}\n\n{}", text.trim(), section.body)
            } else {
                splice_after(&section.body, at, text)
            };
            if i + 1 < count {
                section.pad_before_heading();
            }
            return true;
        }

        false
    }

    /// Move the tags block to the end of the document. Returns true if moved.
    pub fn move_tags_to_end(&mut self) -> bool {
        let Some(index) = self.find_major(MajorBlock::Tags) else {
            return false;
        };
        if index + 1 == self.sections.len() {
            return false;
        }

        let mut tags = self.sections.remove(index);
        let body = tags.body.trim().to_string();
        tags.body.clear();
        tags.append(&body);
        self.push_section(tags);
        true
    }
}
