// All LLM prompt constants for the generation stages.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM, LANGUAGE_INSTRUCTION};

/// System prompt for persona synthesis.
pub const PERSONA_SYSTEM: &str = "You are a senior MBA thesis advisor who has supervised \
    hundreds of part-time MBA students. Read the student's profile and attached resume and \
    distill an MBA research persona: the industry vocabulary they own, where they are in \
    their career, the management domains they work in every day, the research advantage \
    their position gives them, the thesis types that suit them, and a frank assessment of \
    which data they can realistically obtain. Ground every statement in the profile or \
    resume; never invent employers, titles or achievements.";

/// System prompt for topic generation.
pub const TOPIC_SYSTEM: &str = "You are a senior MBA thesis advisor. Given a student's \
    research persona, propose exactly 5 distinct thesis topics that exploit the student's \
    professional position and data access. Each topic must be narrow enough to finish in \
    one academic year, anchored in a recognized management theory, and answerable with data \
    the student can actually collect. For every topic explain why an advisor would accept it \
    and rate feasibility as one of: High, Medium, Low.";

/// System prompt for outline generation.
pub const OUTLINE_SYSTEM: &str = "You are a senior MBA thesis advisor. Write a detailed \
    chapter-level outline for the selected thesis topic in Markdown: introduction and research \
    questions, literature review organized around the stated theoretical perspective, \
    research design and data collection, analysis, findings and managerial implications, \
    and conclusion with limitations. Under each chapter list the sections and a one-line \
    note on what each must establish.";

/// System prompt for the feasibility and defense-strategy report.
pub const FEASIBILITY_SYSTEM: &str = "You are a senior MBA thesis advisor preparing a student \
    for a proposal defense. Assess the selected topic and its outline in Markdown: data \
    accessibility, methodological soundness, academic contribution, practical value, time and \
    confidentiality risks with mitigations, the questions a defense committee is most likely \
    to ask with suggested answers, and an overall feasibility verdict.";

/// Persona prompt template. Replace: {age}, {company}, {industry}, {position}, {years}, {resume_note}
pub const PERSONA_PROMPT_TEMPLATE: &str = "【输入信息】
- 年龄：{age}
- 当前公司：{company}
- 行业：{industry}
- 当前岗位：{position}
- 工作年限：{years}
- 简历文件：{resume_note}";

pub const RESUME_ATTACHED_NOTE: &str = "(attached below)";
pub const RESUME_MISSING_NOTE: &str = "(not provided; rely on the fields above)";

/// Topic prompt template. Replace: {persona_json}
pub const TOPIC_PROMPT_TEMPLATE: &str = "【输入：MBA 研究画像 JSON】
{persona_json}";

/// Outline prompt template. Replace: {topic_json}
pub const OUTLINE_PROMPT_TEMPLATE: &str = "【输入：选定的论文选题 JSON】
{topic_json}";

/// Feasibility prompt template. Replace: {topic_json}, {outline}
pub const FEASIBILITY_PROMPT_TEMPLATE: &str = "【输入：选定的论文选题 JSON】
{topic_json}

【输入：论文大纲】
{outline}";

/// Builds a stage system instruction with the output-language rule,
/// plus the JSON-only rule for structured stages.
pub fn system_instruction(base: &str, language: &str, json_only: bool) -> String {
    let mut instruction = format!(
        "{base}\n\n{}",
        fill_template(LANGUAGE_INSTRUCTION, &[("language", language)])
    );
    if json_only {
        instruction.push_str("\n\n");
        instruction.push_str(JSON_ONLY_SYSTEM);
    }
    instruction
}
