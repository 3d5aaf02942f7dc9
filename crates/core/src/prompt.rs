//! Prompt construction for deck generation.

use crate::config::ServiceConfig;

/// System instruction sent alongside every deck prompt.
pub const SYSTEM_INSTRUCTION: &str = "You write presentation outlines. \
Start every slide with a header line of the exact form \"Slide N: Title\" \
and put each bullet point on its own line below it. \
Do not add any text before the first slide or after the last one.";

/// Builds the instruction text sent to the model.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    /// Lower-cased keywords that mark a programming topic.
    coding_keywords: Vec<String>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::from_config(&ServiceConfig::default())
    }
}

impl PromptBuilder {
    /// Create a builder with the given coding keywords.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            coding_keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Create a builder from the service configuration.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.coding_keywords)
    }

    /// Whether the topic mentions a programming language or framework.
    pub fn is_coding_topic(&self, topic: &str) -> bool {
        let topic = topic.to_lowercase();
        self.coding_keywords.iter().any(|k| topic.contains(k.as_str()))
    }

    /// The system instruction for deck prompts.
    pub fn system_instruction(&self) -> &'static str {
        SYSTEM_INSTRUCTION
    }

    /// Build the prompt for a topic and slide count.
    pub fn build(&self, topic: &str, slide_count: u32) -> String {
        let topic = topic.trim();
        if self.is_coding_topic(topic) {
            coding_prompt(topic, slide_count)
        } else {
            general_prompt(topic, slide_count)
        }
    }
}

fn coding_prompt(topic: &str, slide_count: u32) -> String {
    let lang = topic.to_lowercase();
    format!(
        r#"Generate a PowerPoint presentation on "{topic}" with exactly {slide_count} slides.

Slide Structure:

1. Slide Title: Format as "Slide X: Title".
2. Explanation: Provide clear, structured bullet points.
3. Code Snippets: Format code in fenced blocks using "{lang}" syntax.

Example:

Slide 1: Introduction to {topic}

- {topic} is widely used in software development.
- It is used in web development, automation, and AI.

Slide 2: Hello World Example

- A simple program that prints "Hello, World!" in {topic}.

```{lang}
print("Hello, World!")
```
"#
    )
}

fn general_prompt(topic: &str, slide_count: u32) -> String {
    format!(
        r#"Generate a structured PowerPoint presentation on "{topic}" with exactly {slide_count} slides.

Slide Structure:

1. Slide Title: Format as "Slide X: Title".
2. Content: Bullet points explaining key concepts in simple terms.

Example:

Slide 1: Introduction to {topic}

- Definition of {topic}.
- Importance and real-world applications.

Slide 2: Key Features

- Feature 1: Explanation.
- Feature 2: Explanation.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coding_topic_detection_is_case_insensitive() {
        let builder = PromptBuilder::default();
        assert!(builder.is_coding_topic("Python"));
        assert!(builder.is_coding_topic("advanced python decorators"));
        assert!(builder.is_coding_topic("Building APIs with NODE.JS"));
        assert!(builder.is_coding_topic("Modern C++"));
        assert!(!builder.is_coding_topic("Photosynthesis"));
    }

    #[test]
    fn test_coding_prompt_contains_fence_language() {
        let prompt = PromptBuilder::default().build("Python", 3);
        assert!(prompt.contains("exactly 3 slides"));
        assert!(prompt.contains("```python"));
        assert!(prompt.contains("Slide 1: Introduction to Python"));
    }

    #[test]
    fn test_general_prompt_has_no_code_section() {
        let prompt = PromptBuilder::default().build("World History", 5);
        assert!(prompt.contains("\"World History\" with exactly 5 slides"));
        assert!(!prompt.contains("```"));
        assert!(prompt.contains("Format as \"Slide X: Title\""));
    }

    #[test]
    fn test_custom_keywords() {
        let builder = PromptBuilder::new(["Rust", ""]);
        assert!(builder.is_coding_topic("rust ownership"));
        assert!(!builder.is_coding_topic("Python"));
        // Empty keywords would match everything.
        assert!(!builder.is_coding_topic("gardening"));
    }

    #[test]
    fn test_system_instruction_names_header_format() {
        let builder = PromptBuilder::default();
        assert!(builder.system_instruction().contains("Slide N: Title"));
    }
}
