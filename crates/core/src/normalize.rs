//! Slide normalization and topic key derivation.
//!
//! Everything that reaches the store passes through here: missing fields get
//! their defaults, blank content lines are dropped and topics are reduced to
//! a file-system safe key.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};
use crate::types::{Slide, SlideInput, DEFAULT_TEXT_COLOR, DEFAULT_THEME, DEFAULT_TITLE};

/// Leading list marker produced by most models ("- ", "* ", "• ").
static BULLET_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*•]\s+").unwrap());

/// Characters that cannot appear in a storage file name.
const UNSAFE_KEY_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Longest key we produce, in bytes, leaving room for an extension.
const MAX_KEY_LEN: usize = 200;

/// File-system safe identifier derived from a user supplied topic.
///
/// Whitespace runs collapse to a single underscore, so `"My Topic"`,
/// `"My  Topic"` and `" My\tTopic "` all address the same deck.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicKey(String);

impl TopicKey {
    /// Derive the key for a topic.
    pub fn from_topic(topic: &str) -> Result<Self> {
        let composed: String = topic.nfc().collect();

        let joined = composed.split_whitespace().collect::<Vec<_>>().join("_");
        let safe: String = joined
            .chars()
            .map(|c| {
                if c.is_control() || UNSAFE_KEY_CHARS.contains(&c) {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        let mut key = safe.trim_start_matches('.').to_string();

        if key.len() > MAX_KEY_LEN {
            let mut cut = MAX_KEY_LEN;
            while !key.is_char_boundary(cut) {
                cut -= 1;
            }
            key.truncate(cut);
        }

        if key.is_empty() {
            return Err(Error::InvalidTopic(topic.to_string()));
        }

        Ok(Self(key))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name for this key with the given extension.
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0, extension)
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Treat empty strings the way missing fields are treated.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Normalize one client-supplied slide into the canonical shape.
///
/// - title, theme and colours fall back to their defaults
/// - content entries that are blank after trimming are dropped
/// - `image` is cleared unless `use_images` is set
pub fn normalize_slide(input: SlideInput, use_images: bool) -> Slide {
    let content = input
        .content
        .unwrap_or_default()
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();

    Slide {
        title: non_empty(input.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        content,
        theme: non_empty(input.theme).unwrap_or_else(|| DEFAULT_THEME.to_string()),
        title_color: non_empty(input.title_color)
            .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
        content_color: non_empty(input.content_color)
            .unwrap_or_else(|| DEFAULT_TEXT_COLOR.to_string()),
        image: if use_images { non_empty(input.image) } else { None },
    }
}

/// Normalize a whole deck.
pub fn normalize_slides(inputs: Vec<SlideInput>, use_images: bool) -> Vec<Slide> {
    inputs
        .into_iter()
        .map(|input| normalize_slide(input, use_images))
        .collect()
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (alpha ignored), with or without `#`.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let doubled = format!("{c}{c}");
                rgb[i] = channel(&doubled)?;
            }
            Some(rgb)
        }
        6 | 8 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        _ => None,
    }
}

/// Remove a leading list marker from a bullet line for display.
pub fn strip_bullet_marker(line: &str) -> &str {
    match BULLET_MARKER_REGEX.find(line) {
        Some(m) => &line[m.end()..],
        None => line.trim_start(),
    }
}
