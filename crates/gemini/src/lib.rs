//! Client for the Google Gemini `generateContent` API.
//!
//! Handlers talk to the model through the [`TextGenerator`] trait so a fake
//! can stand in for the real service in tests.

pub mod client;
pub mod error;
pub mod retry;

pub use client::GeminiClient;
pub use error::GatewayError;
pub use retry::RetryPolicy;

use async_trait::async_trait;

/// A single text generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
}

impl GenerationRequest {
    /// A request with no system instruction.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
        }
    }

    /// Attach a system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the request.
    ///
    /// Returns an empty string when the service answered without any text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GatewayError>;
}
