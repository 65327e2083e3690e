// Shared prompt constants and prompt-building utilities.
// Each component that needs oracle calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Common instruction appended to every prompt that writes candidate facts.
pub const PROFILE_ONLY_INSTRUCTION: &str = "\
    CRITICAL: Use ONLY facts present in the resume data provided. \
    Do NOT infer, interpolate, or invent details about the candidate.";

/// Fills `{key}` placeholders in one left-to-right pass.
///
/// Substituted text is never scanned again, so a value that itself contains
/// `{label}` or `{resume_json}` is inserted literally.
pub fn render_prompt(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = values.iter().find_map(|(key, value)| {
            let placeholder_len = key.len() + 2;
            let matches = tail.len() >= placeholder_len
                && tail[1..].starts_with(key)
                && tail[1 + key.len()..].starts_with('}');
            matches.then_some((placeholder_len, *value))
        });
        match hit {
            Some((len, value)) => {
                out.push_str(value);
                rest = &tail[len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
