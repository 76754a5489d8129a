// Shared prompt fragments and prompt-building utilities.
// Stage-specific instructions live in generation/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Output-language instruction. Replace `{language}` before sending.
pub const LANGUAGE_INSTRUCTION: &str = "Write every natural-language value in {language}. \
    Keep JSON keys and enumerated tokens exactly as specified.";

/// Fills `{key}` placeholders in a template.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}
