//! Service configuration.
//!
//! One struct carries every knob that used to differ between deployments:
//! slide-count bounds, the coding-topic keywords, render layout and the
//! gateway retry policy. It deserializes from a JSON file where every field
//! is optional.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Top-level configuration shared by the server and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    pub slide_count: SlideCountBounds,
    /// Topic keywords that select the coding prompt template.
    pub coding_keywords: Vec<String>,
    pub layout: LayoutConfig,
    pub gateway: GatewayConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            slide_count: SlideCountBounds::default(),
            coding_keywords: ["Java", "Python", "JavaScript", "C++", "C#", "React", "Node.js"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            layout: LayoutConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Load a configuration file, filling in defaults for missing fields.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject configurations that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.slide_count.min == 0 || self.slide_count.min > self.slide_count.max {
            return Err(Error::ConfigError(format!(
                "invalid slide count bounds {}..={}",
                self.slide_count.min, self.slide_count.max
            )));
        }
        if self.gateway.timeout_secs == 0 {
            return Err(Error::ConfigError("gateway timeout must be positive".into()));
        }
        if self.layout.slide_width <= 0.0 || self.layout.slide_height <= 0.0 {
            return Err(Error::ConfigError("slide size must be positive".into()));
        }
        Ok(())
    }
}

/// Inclusive bounds on the number of slides a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideCountBounds {
    pub min: u32,
    pub max: u32,
}

impl Default for SlideCountBounds {
    fn default() -> Self {
        Self { min: 1, max: 13 }
    }
}

impl SlideCountBounds {
    /// Return the count if it is within bounds.
    pub fn check(&self, count: u32) -> Result<u32> {
        if count < self.min || count > self.max {
            return Err(Error::SlideCountOutOfRange {
                count,
                min: self.min,
                max: self.max,
            });
        }
        Ok(count)
    }
}

/// A rectangle on the slide, in inches from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoxSpec {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// Positions and fonts used by the renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Slide width in inches.
    pub slide_width: f64,
    /// Slide height in inches.
    pub slide_height: f64,
    pub title: BoxSpec,
    pub body: BoxSpec,
    /// Body box used when the slide carries an image.
    pub body_with_image: BoxSpec,
    pub image: BoxSpec,
    pub title_font_size: f64,
    pub body_font_size: f64,
    pub code_font_size: f64,
    pub font_face: String,
    pub code_font_face: String,
    /// Prepended to every bullet line in PPTX output.
    pub bullet_prefix: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            slide_width: 10.0,
            slide_height: 5.625,
            title: BoxSpec::new(0.5, 0.5, 9.0, 0.8),
            body: BoxSpec::new(0.5, 1.5, 9.0, 3.5),
            body_with_image: BoxSpec::new(0.5, 1.5, 7.0, 3.5),
            image: BoxSpec::new(8.0, 1.5, 2.0, 2.0),
            title_font_size: 28.0,
            body_font_size: 20.0,
            code_font_size: 14.0,
            font_face: "Arial".to_string(),
            code_font_face: "Courier New".to_string(),
            bullet_prefix: "🔹 ".to_string(),
        }
    }
}

/// Generative API endpoint and retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    pub base_url: String,
    pub model: String,
    /// Per-attempt timeout.
    pub timeout_secs: u64,
    /// Retries after the first attempt, transient failures only.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            backoff_base_ms: 500,
            backoff_max_ms: 8_000,
        }
    }
}
