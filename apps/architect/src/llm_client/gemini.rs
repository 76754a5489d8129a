//! Gemini `generateContent` transport.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::GatewayError;
use crate::llm_client::{ContentPart, GenerationRequest, GenerationTransport, LlmResponse, Usage, MODEL};
use crate::schema::Shape;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: GeminiBlob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<GeminiThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

impl GeminiResponse {
    /// Text of the first candidate, thought summaries excluded.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Renders a shape declaration into Gemini's `responseSchema` dialect.
pub fn to_gemini_schema(shape: &Shape) -> Value {
    match shape {
        Shape::String => json!({ "type": "STRING" }),
        Shape::Number => json!({ "type": "NUMBER" }),
        Shape::Enum(tokens) => json!({ "type": "STRING", "format": "enum", "enum": tokens }),
        Shape::Array(item) => json!({ "type": "ARRAY", "items": to_gemini_schema(item) }),
        Shape::Object(fields) => {
            let properties: Map<String, Value> = fields
                .iter()
                .map(|f| (f.name.to_string(), to_gemini_schema(&f.shape)))
                .collect();
            let ordering: Vec<&str> = fields.iter().map(|f| f.name).collect();
            json!({
                "type": "OBJECT",
                "properties": properties,
                "required": shape.required_fields(),
                "propertyOrdering": ordering,
            })
        }
    }
}

/// Gemini-backed transport. One request per call, no retries.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::Configuration(
                "API key is missing. Set GEMINI_API_KEY in the environment.".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, MODEL)
    }
}

fn build_request_body(request: &GenerationRequest) -> GeminiRequest<'_> {
    let parts = request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => GeminiPart::Text { text },
            ContentPart::InlineData { mime_type, data } => GeminiPart::Inline {
                inline_data: GeminiBlob { mime_type, data },
            },
        })
        .collect();

    let generation_config = match (&request.response_shape, request.thinking_budget) {
        (None, None) => None,
        (shape, budget) => Some(GeminiGenerationConfig {
            response_mime_type: shape.as_ref().map(|_| "application/json"),
            response_schema: shape.as_ref().map(to_gemini_schema),
            thinking_config: budget.map(|thinking_budget| GeminiThinkingConfig { thinking_budget }),
        }),
    };

    GeminiRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart::Text {
                text: &request.system_instruction,
            }],
        },
        contents: vec![GeminiContent {
            role: Some("user"),
            parts,
        }],
        generation_config,
    }
}

#[async_trait]
impl GenerationTransport for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse, GatewayError> {
        let body = build_request_body(request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}: {}", status, body);
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GatewayError::TransportFailure(format!(
                "Gemini API error (status {}): {}",
                status.as_u16(),
                message
            )));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            GatewayError::TransportFailure(format!("Unreadable Gemini response: {e}"))
        })?;

        if let Some(reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            warn!("Gemini blocked the prompt: {reason}");
        }
        if let Some(finish) = parsed.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            if finish != "STOP" {
                warn!("Gemini finished with reason {finish}");
            }
        }

        let usage = parsed.usage_metadata.as_ref().map(|u| Usage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });
        if let Some(usage) = usage {
            debug!(
                "Gemini call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(LlmResponse {
            text: parsed.text(),
            usage,
        })
    }
}
