use serde::{Deserialize, Serialize};

/// MBA research persona synthesized from the profile and resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub industry_keywords: Vec<String>,
    pub career_stage: String,
    pub core_management_domains: Vec<String>,
    pub unique_research_advantage: String,
    pub suitable_thesis_types: Vec<String>,
    pub data_access_assessment: String,
}
