//! Parser for freeform AI slide text.
//!
//! The model answers with loosely formatted text such as:
//!
//! ~~~text
//! Slide 1: Basics
//! - point a
//!
//! Slide 2: Hello World
//! ```python
//! print("hi")
//! ```
//! ~~~
//!
//! Each line is classified on its own with anchored patterns (header,
//! fence, blank, text) and fed to a small state machine that accumulates
//! one slide at a time. A word like "slide" in the middle of a sentence never
//! starts a new section.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::types::{ContentLine, Slide, DEFAULT_TITLE};

/// `Slide N: Title`, optionally wrapped in markdown heading or bold markers.
static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:#{1,6}\s*)?(?:\*\*)?\s*Slide\s+(\d+)\s*:\s*(?:\*\*)?\s*(.*?)\s*(?:\*\*)?\s*$")
        .unwrap()
});

/// A line opening or closing a fenced code block.
static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*```(.*)$").unwrap());

/// How a single line of AI output is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    /// Slide header carrying the title text.
    Header(&'a str),
    /// Code fence, carrying the info string (language) if any.
    Fence(&'a str),
    Blank,
    Text(&'a str),
}

fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(caps) = HEADER_REGEX.captures(line) {
        let title = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        return LineKind::Header(title);
    }
    if let Some(caps) = FENCE_REGEX.captures(line) {
        let info = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        // "```x```" on one line is inline code, not a fence.
        if !info.contains("```") {
            return LineKind::Fence(info.trim());
        }
    }
    LineKind::Text(line.trim())
}

/// An open fenced block.
#[derive(Debug, Default)]
struct CodeBlock {
    language: Option<String>,
    lines: Vec<String>,
}

impl CodeBlock {
    fn open(info: &str) -> Self {
        let language = info
            .split_whitespace()
            .next()
            .map(|l| l.to_string());
        Self {
            language,
            lines: Vec::new(),
        }
    }

    /// The stored entry, or `None` when the block holds no code.
    fn finish(mut self) -> Option<String> {
        while self.lines.last().is_some_and(|l| l.trim().is_empty()) {
            self.lines.pop();
        }
        let first = self.lines.iter().position(|l| !l.trim().is_empty())?;
        Some(ContentLine::code_block(
            self.language.as_deref(),
            &self.lines[first..],
        ))
    }
}

/// Accumulates one slide.
#[derive(Debug)]
struct SlideBuilder {
    slide: Slide,
    code: Option<CodeBlock>,
}

impl SlideBuilder {
    fn new(title: &str) -> Self {
        let title = if title.is_empty() { DEFAULT_TITLE } else { title };
        Self {
            slide: Slide::new(title),
            code: None,
        }
    }

    fn close_code(&mut self) {
        if let Some(entry) = self.code.take().and_then(CodeBlock::finish) {
            self.slide.push_content(entry);
        }
    }

    fn finish(mut self) -> Slide {
        self.close_code();
        self.slide
    }
}

/// Parser turning AI response text into slides.
#[derive(Debug, Clone, Default)]
pub struct ResponseParser;

impl ResponseParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse AI text into slides.
    ///
    /// Returns [`Error::InvalidAiResponse`] when no slide header is found.
    pub fn parse(&self, text: &str) -> Result<Vec<Slide>> {
        let mut slides = Vec::new();
        let mut current: Option<SlideBuilder> = None;

        for line in text.lines() {
            let kind = classify(line);

            if current.as_ref().is_some_and(|b| b.code.is_some()) {
                match kind {
                    LineKind::Fence(_) => {
                        if let Some(builder) = current.as_mut() {
                            builder.close_code();
                        }
                    }
                    // A header always wins; models regularly forget to
                    // close their last fence.
                    LineKind::Header(title) => {
                        if let Some(done) = current.replace(SlideBuilder::new(title)) {
                            slides.push(done.finish());
                        }
                    }
                    LineKind::Blank | LineKind::Text(_) => {
                        if let Some(code) = current.as_mut().and_then(|b| b.code.as_mut()) {
                            code.lines.push(line.trim_end().to_string());
                        }
                    }
                }
                continue;
            }

            match kind {
                LineKind::Header(title) => {
                    if let Some(done) = current.replace(SlideBuilder::new(title)) {
                        slides.push(done.finish());
                    }
                }
                LineKind::Fence(info) => {
                    if let Some(builder) = current.as_mut() {
                        builder.code = Some(CodeBlock::open(info));
                    }
                }
                LineKind::Blank => {}
                LineKind::Text(text) => {
                    if let Some(builder) = current.as_mut() {
                        builder.slide.push_content(text);
                    }
                }
            }
        }

        if let Some(done) = current.take() {
            slides.push(done.finish());
        }

        if slides.is_empty() {
            log::debug!("No slide headers found in {} bytes of AI text", text.len());
            return Err(Error::InvalidAiResponse);
        }

        log::debug!("Parsed {} slides from AI text", slides.len());
        Ok(slides)
    }
}
