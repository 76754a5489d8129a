//! Response shape declarations for the structured generation stages.

use crate::models::topic::FEASIBILITY_TOKENS;
use crate::schema::{Field, Shape};

pub fn persona_shape() -> Shape {
    Shape::Object(vec![
        Field::required("industry_keywords", Shape::string_list()),
        Field::required("career_stage", Shape::String),
        Field::required("core_management_domains", Shape::string_list()),
        Field::required("unique_research_advantage", Shape::String),
        Field::required("suitable_thesis_types", Shape::string_list()),
        Field::required("data_access_assessment", Shape::String),
    ])
}

pub fn topic_shape() -> Shape {
    Shape::Object(vec![
        Field::required("title", Shape::String),
        Field::required("background", Shape::String),
        Field::required("research_questions", Shape::string_list()),
        Field::required("theoretical_perspective", Shape::String),
        Field::required("data_sources", Shape::String),
        Field::required("methodology", Shape::String),
        Field::optional("academic_value", Shape::String),
        Field::optional("practical_value", Shape::String),
        Field::required("advisor_acceptance_reason", Shape::String),
        Field::required("feasibility", Shape::Enum(FEASIBILITY_TOKENS)),
    ])
}

pub fn topics_shape() -> Shape {
    Shape::array(topic_shape())
}
