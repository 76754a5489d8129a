//! Generation gateway: one round-trip to the model per wizard stage.
//!
//! Flow per call: build prompt → transport.generate → reject empty text →
//! (structured stages) strip fences, parse, shape-check, deserialize.
//! Nothing is retried; every failure surfaces as a `GatewayError`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_OUTPUT_LANGUAGE};
use crate::errors::GatewayError;
use crate::generation::prompts::{
    system_instruction, FEASIBILITY_PROMPT_TEMPLATE, FEASIBILITY_SYSTEM, OUTLINE_PROMPT_TEMPLATE,
    OUTLINE_SYSTEM, PERSONA_PROMPT_TEMPLATE, PERSONA_SYSTEM, RESUME_ATTACHED_NOTE,
    RESUME_MISSING_NOTE, TOPIC_PROMPT_TEMPLATE, TOPIC_SYSTEM,
};
use crate::generation::shapes::{persona_shape, topics_shape};
use crate::llm_client::prompts::fill_template;
use crate::llm_client::{ContentPart, GeminiClient, GenerationRequest, GenerationTransport};
use crate::models::{FeasibilityReport, Outline, Persona, ThesisTopic, UserProfile};
use crate::schema::{decode_structured, Shape};

/// Number of topics the topic stage asks for. Other counts are accepted with a warning.
pub const TARGET_TOPIC_COUNT: usize = 5;

#[derive(Clone)]
pub struct GenerationGateway {
    transport: Arc<dyn GenerationTransport>,
    output_language: String,
}

impl GenerationGateway {
    pub fn new(transport: Arc<dyn GenerationTransport>) -> Self {
        Self {
            transport,
            output_language: DEFAULT_OUTPUT_LANGUAGE.to_string(),
        }
    }

    /// Production gateway backed by Gemini. Fails before any request if the credential is unusable.
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let client = GeminiClient::new(config)?;
        Ok(Self::new(Arc::new(client)).with_output_language(&config.output_language))
    }

    pub fn with_output_language(mut self, language: impl Into<String>) -> Self {
        self.output_language = language.into();
        self
    }

    pub async fn synthesize_persona(&self, profile: &UserProfile) -> Result<Persona, GatewayError> {
        let request = build_persona_request(profile, &self.output_language);
        let persona: Persona = self
            .call_structured(request, &persona_shape(), "persona")
            .await?;
        info!(
            "Persona synthesized: {} industry keywords, stage '{}'",
            persona.industry_keywords.len(),
            persona.career_stage
        );
        Ok(persona)
    }

    pub async fn synthesize_topics(&self, persona: &Persona) -> Result<Vec<ThesisTopic>, GatewayError> {
        let persona_json = to_prompt_json(persona, true)?;
        let prompt = fill_template(TOPIC_PROMPT_TEMPLATE, &[("persona_json", persona_json.as_str())]);
        let request = GenerationRequest::text(
            system_instruction(TOPIC_SYSTEM, &self.output_language, true),
            prompt,
        )
        .with_thinking_budget(0);

        let topics: Vec<ThesisTopic> = self
            .call_structured(request, &topics_shape(), "topics")
            .await?;
        if topics.len() != TARGET_TOPIC_COUNT {
            warn!(
                "Topic stage returned {} topics, expected {}",
                topics.len(),
                TARGET_TOPIC_COUNT
            );
        }
        Ok(topics)
    }

    pub async fn synthesize_outline(&self, topic: &ThesisTopic) -> Result<Outline, GatewayError> {
        let topic_json = to_prompt_json(topic, true)?;
        let prompt = fill_template(OUTLINE_PROMPT_TEMPLATE, &[("topic_json", topic_json.as_str())]);
        let request = GenerationRequest::text(
            system_instruction(OUTLINE_SYSTEM, &self.output_language, false),
            prompt,
        );

        let text = self.call_text(request, "outline").await?;
        Ok(Outline::new(text))
    }

    pub async fn synthesize_feasibility(
        &self,
        topic: &ThesisTopic,
        outline: &Outline,
    ) -> Result<FeasibilityReport, GatewayError> {
        let topic_json = to_prompt_json(topic, false)?;
        let prompt = fill_template(
            FEASIBILITY_PROMPT_TEMPLATE,
            &[("topic_json", topic_json.as_str()), ("outline", outline.as_str())],
        );
        let request = GenerationRequest::text(
            system_instruction(FEASIBILITY_SYSTEM, &self.output_language, false),
            prompt,
        );

        let text = self.call_text(request, "feasibility").await?;
        Ok(FeasibilityReport::new(text))
    }

    /// Sends the request and returns the model's text verbatim, rejecting blank output.
    async fn call_text(&self, request: GenerationRequest, stage: &str) -> Result<String, GatewayError> {
        debug!(
            "Sending {stage} request: {} parts, structured={}",
            request.parts.len(),
            request.response_shape.is_some()
        );

        let response = self.transport.generate(&request).await?;
        if let Some(usage) = response.usage {
            debug!(
                "{stage} call used input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        response
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or(GatewayError::EmptyResponse)
    }

    /// Asks for JSON of `shape` and decodes the reply against the same shape.
    async fn call_structured<T: DeserializeOwned>(
        &self,
        request: GenerationRequest,
        shape: &Shape,
        stage: &str,
    ) -> Result<T, GatewayError> {
        let text = self.call_text(request.expecting(shape.clone()), stage).await?;
        decode_structured(&text, shape)
    }
}

fn build_persona_request(profile: &UserProfile, language: &str) -> GenerationRequest {
    let resume_note = if profile.resume.is_some() {
        RESUME_ATTACHED_NOTE
    } else {
        RESUME_MISSING_NOTE
    };
    let prompt = fill_template(
        PERSONA_PROMPT_TEMPLATE,
        &[
            ("age", profile.age.as_str()),
            ("company", profile.company.as_str()),
            ("industry", profile.industry.as_str()),
            ("position", profile.position.as_str()),
            ("years", profile.years.as_str()),
            ("resume_note", resume_note),
        ],
    );

    let mut request =
        GenerationRequest::text(system_instruction(PERSONA_SYSTEM, language, true), prompt);

    if let Some(resume) = &profile.resume {
        request = request.with_part(ContentPart::InlineData {
            mime_type: resume.media_type().to_string(),
            data: resume.encoded(),
        });
    }
    request
}

fn to_prompt_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, GatewayError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    // Never model output: a failure here happens before anything is sent.
    json.map_err(|e| GatewayError::TransportFailure(format!("Failed to encode prompt payload: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::llm_client::testing::ScriptedTransport;
    use crate::llm_client::{LlmResponse, Usage};
    use crate::models::{Feasibility, ResumeAttachment};

    fn gateway(transport: &Arc<ScriptedTransport>) -> GenerationGateway {
        GenerationGateway::new(transport.clone())
    }

    fn acme_profile() -> UserProfile {
        UserProfile {
            age: "35".into(),
            company: "Acme".into(),
            industry: "FinTech".into(),
            position: "PM".into(),
            years: "10".into(),
            resume: Some(ResumeAttachment::pdf(b"%PDF-1.4 resume".to_vec())),
        }
    }

    fn persona_json() -> String {
        json!({
            "industry_keywords": ["digital payments", "risk control"],
            "career_stage": "mid-career product leader",
            "core_management_domains": ["product management", "operations"],
            "unique_research_advantage": "owns the merchant onboarding funnel",
            "suitable_thesis_types": ["case study", "empirical"],
            "data_access_assessment": "internal funnel data available"
        })
        .to_string()
    }

    fn sample_persona() -> Persona {
        serde_json::from_str(&persona_json()).unwrap()
    }

    fn topic_value(title: &str, feasibility: &str) -> serde_json::Value {
        json!({
            "title": title,
            "background": "Merchant churn is rising",
            "research_questions": ["What drives churn?", "Which levers work?"],
            "theoretical_perspective": "Resource-based view",
            "data_sources": "Onboarding funnel logs",
            "methodology": "Mixed methods",
            "academic_value": "Extends RBV to platforms",
            "practical_value": "Reduces churn",
            "advisor_acceptance_reason": "Clear data access",
            "feasibility": feasibility
        })
    }

    fn sample_topic() -> ThesisTopic {
        serde_json::from_value(topic_value("Merchant churn", "High")).unwrap()
    }

    #[tokio::test]
    async fn test_persona_request_embeds_profile_and_resume() {
        let transport = ScriptedTransport::text(&persona_json());
        let persona = gateway(&transport).synthesize_persona(&acme_profile()).await.unwrap();

        assert_eq!(persona.industry_keywords.len(), 2);
        assert!(!persona.career_stage.is_empty());
        assert!(!persona.core_management_domains.is_empty());
        assert!(!persona.suitable_thesis_types.is_empty());

        let request = transport.last_request();
        let prompt = request.prompt_text();
        assert!(prompt.contains("Acme"));
        assert!(prompt.contains("FinTech"));
        assert!(prompt.contains(RESUME_ATTACHED_NOTE));
        assert_eq!(request.response_shape, Some(persona_shape()));
        assert_eq!(
            request.parts[1],
            ContentPart::InlineData {
                mime_type: "application/pdf".into(),
                data: ResumeAttachment::pdf(b"%PDF-1.4 resume".to_vec()).encoded(),
            }
        );
    }

    #[tokio::test]
    async fn test_persona_without_resume_sends_text_only() {
        let transport = ScriptedTransport::text(&persona_json());
        let mut profile = acme_profile();
        profile.resume = None;

        gateway(&transport).synthesize_persona(&profile).await.unwrap();

        let request = transport.last_request();
        assert_eq!(request.parts.len(), 1);
        assert!(request.prompt_text().contains(RESUME_MISSING_NOTE));
    }

    #[tokio::test]
    async fn test_persona_accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", persona_json());
        let transport = ScriptedTransport::text(&fenced);
        let persona = gateway(&transport).synthesize_persona(&acme_profile()).await.unwrap();
        assert_eq!(persona, sample_persona());
    }

    #[tokio::test]
    async fn test_empty_text_is_empty_response() {
        for reply in [LlmResponse::default(), LlmResponse::from_text("  \n ")] {
            let transport = ScriptedTransport::new(vec![Ok(reply)]);
            let result = gateway(&transport).synthesize_persona(&acme_profile()).await;
            assert_eq!(result.unwrap_err(), GatewayError::EmptyResponse);
        }
    }

    #[tokio::test]
    async fn test_prose_is_malformed_output() {
        let transport = ScriptedTransport::text("I could not read the resume, sorry.");
        let result = gateway(&transport).synthesize_persona(&acme_profile()).await;
        assert!(matches!(result, Err(GatewayError::MalformedOutput(_))));
    }

    #[tokio::test]
    async fn test_missing_persona_field_is_schema_violation() {
        let transport = ScriptedTransport::text(r#"{"industry_keywords": ["x"], "career_stage": "y"}"#);
        let result = gateway(&transport).synthesize_persona(&acme_profile()).await;
        assert!(matches!(result, Err(GatewayError::SchemaViolation(_))));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let transport = ScriptedTransport::new(vec![Err(GatewayError::TransportFailure(
            "rate limited".into(),
        ))]);
        let result = gateway(&transport).synthesize_persona(&acme_profile()).await;
        assert_eq!(result.unwrap_err().to_string(), "rate limited");
    }

    #[tokio::test]
    async fn test_topics_accept_localized_feasibility() {
        let body = json!([
            topic_value("A", "High"),
            topic_value("B", "中"),
            topic_value("C", "低"),
            topic_value("D", "高"),
            topic_value("E", "Medium"),
        ])
        .to_string();
        let transport = ScriptedTransport::text(&body);

        let topics = gateway(&transport).synthesize_topics(&sample_persona()).await.unwrap();

        assert_eq!(topics.len(), TARGET_TOPIC_COUNT);
        let ratings: Vec<Feasibility> = topics.iter().map(|t| t.feasibility).collect();
        assert_eq!(
            ratings,
            vec![
                Feasibility::High,
                Feasibility::Medium,
                Feasibility::Low,
                Feasibility::High,
                Feasibility::Medium
            ]
        );

        let request = transport.last_request();
        assert_eq!(request.thinking_budget, Some(0));
        assert_eq!(request.response_shape, Some(topics_shape()));
        assert!(request.prompt_text().contains("\"career_stage\": \"mid-career product leader\""));
    }

    #[tokio::test]
    async fn test_topic_count_is_advisory() {
        let body = json!([topic_value("Only one", "Low")]).to_string();
        let transport = ScriptedTransport::text(&body);
        let topics = gateway(&transport).synthesize_topics(&sample_persona()).await.unwrap();
        assert_eq!(topics.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_feasibility_is_schema_violation() {
        let body = json!([topic_value("A", "Unclear")]).to_string();
        let transport = ScriptedTransport::text(&body);
        let result = gateway(&transport).synthesize_topics(&sample_persona()).await;
        assert!(matches!(result, Err(GatewayError::SchemaViolation(_))));
    }

    #[tokio::test]
    async fn test_outline_is_returned_verbatim() {
        let markdown = "```markdown\n# 第一章 绪论\n```\n";
        let transport = ScriptedTransport::new(vec![Ok(LlmResponse {
            text: Some(markdown.to_string()),
            usage: Some(Usage {
                input_tokens: 10,
                output_tokens: 20,
            }),
        })]);

        let outline = gateway(&transport).synthesize_outline(&sample_topic()).await.unwrap();

        assert_eq!(outline.as_str(), markdown);
        let request = transport.last_request();
        assert!(request.response_shape.is_none());
        assert!(request.prompt_text().contains("\"title\": \"Merchant churn\""));
    }

    #[tokio::test]
    async fn test_feasibility_prompt_carries_topic_and_outline() {
        let transport = ScriptedTransport::text("## Verdict\nFeasible.");
        let outline = Outline::new("# Chapter 1\n# Chapter 2");

        let report = gateway(&transport)
            .synthesize_feasibility(&sample_topic(), &outline)
            .await
            .unwrap();

        assert_eq!(report.as_str(), "## Verdict\nFeasible.");
        let prompt = transport.last_request().prompt_text();
        assert!(prompt.contains("{\"title\":\"Merchant churn\""));
        assert!(prompt.contains("# Chapter 1\n# Chapter 2"));
    }

    #[tokio::test]
    async fn test_output_language_reaches_system_instruction() {
        let transport = ScriptedTransport::text("outline");
        gateway(&transport)
            .with_output_language("English")
            .synthesize_outline(&sample_topic())
            .await
            .unwrap();
        assert!(transport.last_request().system_instruction.contains("in English"));
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    #[test]
    fn test_prompt_encoding_failure_is_not_blamed_on_model() {
        let err = to_prompt_json(&Unencodable, true).unwrap_err();
        assert!(matches!(err, GatewayError::TransportFailure(_)));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("cannot encode"));
    }

    #[test]
    fn test_from_config_rejects_blank_key() {
        let result = GenerationGateway::from_config(&Config::new(""));
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }
}
