use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tokens the model may use for a feasibility rating, canonical English first.
pub const FEASIBILITY_TOKENS: &[&str] = &["High", "Medium", "Low", "高", "中", "低"];

/// Feasibility rating of a candidate topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feasibility {
    High,
    Medium,
    Low,
}

impl Feasibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feasibility::High => "High",
            Feasibility::Medium => "Medium",
            Feasibility::Low => "Low",
        }
    }
}

impl FromStr for Feasibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        match token {
            "高" => return Ok(Feasibility::High),
            "中" => return Ok(Feasibility::Medium),
            "低" => return Ok(Feasibility::Low),
            _ => {}
        }
        match token.to_ascii_lowercase().as_str() {
            "high" => Ok(Feasibility::High),
            "medium" => Ok(Feasibility::Medium),
            "low" => Ok(Feasibility::Low),
            _ => Err(format!(
                "unrecognized feasibility '{token}', expected one of {}",
                FEASIBILITY_TOKENS.join(", ")
            )),
        }
    }
}

impl fmt::Display for Feasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Feasibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Feasibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One candidate thesis proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThesisTopic {
    pub title: String,
    pub background: String,
    pub research_questions: Vec<String>,
    pub theoretical_perspective: String,
    pub data_sources: String,
    pub methodology: String,
    #[serde(default)]
    pub academic_value: String,
    #[serde(default)]
    pub practical_value: String,
    pub advisor_acceptance_reason: String,
    pub feasibility: Feasibility,
}

/// Thesis outline as written by the model, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outline(String);

impl Outline {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Outline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Feasibility and defense-strategy report, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeasibilityReport(String);

impl FeasibilityReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FeasibilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feasibility_accepts_localized_synonyms() {
        for (token, expected) in [
            ("高", Feasibility::High),
            ("中", Feasibility::Medium),
            ("低", Feasibility::Low),
        ] {
            let parsed: Feasibility = serde_json::from_value(serde_json::json!(token)).unwrap();
            assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn test_feasibility_is_case_and_whitespace_tolerant() {
        assert_eq!(" high ".parse::<Feasibility>(), Ok(Feasibility::High));
        assert_eq!("MEDIUM".parse::<Feasibility>(), Ok(Feasibility::Medium));
        assert_eq!("Low".parse::<Feasibility>(), Ok(Feasibility::Low));
    }

    #[test]
    fn test_feasibility_rejects_unknown_token() {
        let err = "Very High".parse::<Feasibility>().unwrap_err();
        assert!(err.contains("Very High"));
        assert!(serde_json::from_value::<Feasibility>(serde_json::json!("maybe")).is_err());
    }

    #[test]
    fn test_feasibility_serializes_canonical_token() {
        let parsed: Feasibility = serde_json::from_value(serde_json::json!("高")).unwrap();
        assert_eq!(serde_json::to_value(parsed).unwrap(), serde_json::json!("High"));
    }

    #[test]
    fn test_every_token_in_list_parses() {
        for token in FEASIBILITY_TOKENS {
            assert!(token.parse::<Feasibility>().is_ok(), "{token} should parse");
        }
    }

    #[test]
    fn test_topic_value_fields_default_when_absent() {
        let json = serde_json::json!({
            "title": "Digital lending risk controls",
            "background": "bg",
            "research_questions": ["RQ1", "RQ2"],
            "theoretical_perspective": "Agency theory",
            "data_sources": "Internal loan book",
            "methodology": "Case study",
            "advisor_acceptance_reason": "Clear scope",
            "feasibility": "中"
        });
        let topic: ThesisTopic = serde_json::from_value(json).unwrap();
        assert_eq!(topic.academic_value, "");
        assert_eq!(topic.practical_value, "");
        assert_eq!(topic.feasibility, Feasibility::Medium);
    }

    #[test]
    fn test_outline_is_transparent_text() {
        let outline = Outline::new("# Chapter 1\n");
        assert_eq!(serde_json::to_value(&outline).unwrap(), serde_json::json!("# Chapter 1\n"));
        assert_eq!(outline.to_string(), "# Chapter 1\n");
        assert!(!outline.is_blank());
        assert!(Outline::new(" \n").is_blank());
    }
}
