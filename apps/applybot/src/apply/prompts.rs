// Form Mapper LLM prompt templates.

pub const FIELD_MAP_SYSTEM: &str = "\
You fill job application forms on behalf of a candidate. \
Answer with the exact value to type into the field and nothing else: \
no quotes, no labels, no explanation. \
If the resume data has nothing that belongs in the field, answer SKIP.";

/// Per-field mapping prompt. Replace `{name}`, `{id}`, `{placeholder}`, `{label}`
/// and `{resume_json}` before sending.
pub const FIELD_MAP_PROMPT: &str = r#"Field information:
- Name: {name}
- ID: {id}
- Placeholder: {placeholder}
- Label: {label}

Resume data:
{resume_json}

What resume data should go in this field? Return the exact value or 'SKIP' if not applicable."#;

/// Whole-form mapping prompt. Replace `{fields_json}` and `{resume_json}` before sending.
pub const FORM_MAP_PROMPT: &str = r#"These are the fields of a job application form:
{fields_json}

Resume data:
{resume_json}

For every field decide what resume data should go in it.

OUTPUT SCHEMA (return exactly this structure):
{
  "<field index>": "<exact value to enter, or SKIP if not applicable>"
}

Include every field index exactly once."#;
