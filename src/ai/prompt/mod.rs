//! Prompt Builder System
//!
//! Standardized prompt construction for LLM interactions.
//!
//! ## Design Principles
//!
//! 1. **Role Definition**: Clear AI role for each task
//! 2. **Structured Objectives**: Numbered goals
//! 3. **Delimited Context**: Inputs wrapped in tags the model is told not to rewrite
//! 4. **Focus Enforcement**: Hard rules listed separately from objectives

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Text section under a header
    Text { header: String, content: String },
    /// Bulleted list with header
    Bullets { header: String, items: Vec<String> },
    /// Content wrapped in an XML-style tag
    Delimited { tag: String, content: String },
    /// Focus enforcement with restrictions
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives<S: Into<String>>(mut self, objectives: impl IntoIterator<Item = S>) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: header.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add a bulleted list; skipped when `items` is empty
    pub fn bullets<S: Into<String>>(
        mut self,
        header: &str,
        items: impl IntoIterator<Item = S>,
    ) -> Self {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if !items.is_empty() {
            self.sections.push(PromptSection::Bullets {
                header: header.to_string(),
                items,
            });
        }
        self
    }

    /// Add content wrapped in `<TAG>...</TAG>`
    pub fn delimited(mut self, tag: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Delimited {
            tag: tag.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Add focus enforcement section
    pub fn focus<S: Into<String>>(
        mut self,
        target: &str,
        restrictions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Text { header, content } => {
                    prompt.push_str(&format!("# {}\n\n", header));
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Bullets { header, items } => {
                    prompt.push_str(&format!("# {}\n\n", header));
                    for item in items {
                        prompt.push_str(&format!("- {}\n", item));
                    }
                    prompt.push('\n');
                }
                PromptSection::Delimited { tag, content } => {
                    prompt.push_str(&format!("<{}>\n", tag));
                    prompt.push_str(content.trim_end());
                    prompt.push_str(&format!("\n</{}>\n\n", tag));
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str("<FOCUS>\n");
                    prompt.push_str(&format!("IMPORTANT: Focus EXCLUSIVELY on: {}\n", target));
                    for restriction in restrictions {
                        prompt.push_str(&format!("- {}\n", restriction));
                    }
                    prompt.push_str("</FOCUS>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

/// Preset prompt templates
pub struct PromptTemplates;

impl PromptTemplates {
    /// Template for extending an existing script without rewriting it
    pub fn script_extension(word_target: usize) -> PromptBuilder {
        PromptBuilder::new()
            .role("script writer", "extending long-form scripts")
            .focus(
                "writing the NEW content requested below",
                vec![
                    "Do NOT rewrite, summarize or repeat the existing script".to_string(),
                    "Do NOT add a heading that already exists in the script".to_string(),
                    format!(
                        "Write AT LEAST {} words. Shorter output is unacceptable",
                        word_target
                    ),
                    "Start directly with the content. No preamble, no closing remarks".to_string(),
                ],
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("script writer", "video scripts")
            .objectives(["Add an outro", "Expand the intro"])
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("script writer"));
        assert!(prompt.contains("<OBJECTIVES>"));
        assert!(prompt.contains("1. Add an outro"));
        assert!(prompt.contains("2. Expand the intro"));
    }

    #[test]
    fn test_focus_section() {
        let prompt = PromptBuilder::new()
            .focus("the outro", ["Do NOT repeat", "Stay focused"])
            .build();

        assert!(prompt.contains("<FOCUS>"));
        assert!(prompt.contains("the outro"));
        assert!(prompt.contains("- Do NOT repeat"));
    }

    #[test]
    fn test_delimited_section() {
        let prompt = PromptBuilder::new()
            .delimited("CURRENT_SCRIPT", "### Intro\nHello.\n\n")
            .build();

        assert_eq!(prompt, "<CURRENT_SCRIPT>\n### Intro\nHello.\n</CURRENT_SCRIPT>");
    }

    #[test]
    fn test_empty_bullets_skipped() {
        let prompt = PromptBuilder::new()
            .section("Task", "body")
            .bullets("Sources", Vec::<String>::new())
            .build();

        assert_eq!(prompt, "# Task\n\nbody");
    }

    #[test]
    fn test_template() {
        let prompt = PromptTemplates::script_extension(420)
            .section("Task", "Write the conclusion")
            .build();

        assert!(prompt.contains("AT LEAST 420 words"));
        assert!(prompt.contains("# Task"));
    }
}
