//! LLM client: the single point of entry for all generative-model calls.
//!
//! No other module talks HTTP to the model vendor. The gateway holds an
//! `Arc<dyn GenerationTransport>`; `GeminiClient` is the production
//! implementation and tests substitute scripted transports.

use async_trait::async_trait;

use crate::errors::GatewayError;
use crate::schema::Shape;

pub mod gemini;
pub mod prompts;
#[cfg(test)]
pub(crate) mod testing;

pub use gemini::GeminiClient;

/// The model used for every generation stage.
/// Hardcoded so all stages stay on the same model.
pub const MODEL: &str = "gemini-2.5-flash";

/// One piece of user content sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Binary attachment, already base64-encoded.
    InlineData { mime_type: String, data: String },
}

/// Everything needed for a single round-trip to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub parts: Vec<ContentPart>,
    /// When set, the model is asked for JSON of this shape.
    pub response_shape: Option<Shape>,
    pub thinking_budget: Option<u32>,
}

impl GenerationRequest {
    pub fn text(system_instruction: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            parts: vec![ContentPart::Text(prompt.into())],
            response_shape: None,
            thinking_budget: None,
        }
    }

    pub fn with_part(mut self, part: ContentPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn expecting(mut self, shape: Shape) -> Self {
        self.response_shape = Some(shape);
        self
    }

    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    /// Concatenated text parts, mostly useful for logging and assertions.
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                ContentPart::Text(t) => Some(t.as_str()),
                ContentPart::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// What came back from the model. `text` is `None` when nothing usable was returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmResponse {
    pub text: Option<String>,
    pub usage: Option<Usage>,
}

impl LlmResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            usage: None,
        }
    }
}

/// Transport seam for the generative model. Object-safe so it can live behind `Arc<dyn _>`.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse, GatewayError>;
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    let rest = rest.trim_start();
    rest.strip_suffix("```").map(str::trim).unwrap_or(rest)
}
