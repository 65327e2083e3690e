// Resume Extractor LLM prompt templates.
// All prompts for the resume module are defined here.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are a precise resume data extractor. \
Parse the text of a resume into structured JSON. \
You MUST respond with valid JSON only — no markdown fences, no explanations. \
Copy values exactly as written in the resume. \
If a piece of information is not present, use an empty string or an empty list.";

/// Resume extraction prompt. Replace `{resume_text}` before sending.
pub const RESUME_PARSE_PROMPT: &str = r#"Extract the following information from this resume:
1. Full Name
2. Email
3. Phone Number
4. Location
5. Summary/Objective
6. Skills (list)
7. Work Experience (list of jobs with title, company, dates, responsibilities)
8. Education (list of degrees with institution, dates)
9. Certifications (if any)
10. Projects (if any)

RESUME TEXT:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "name": "string",
  "email": "string",
  "phone": "string",
  "location": "string",
  "summary": "string",
  "skills": ["string"],
  "work_experience": [
    {"title": "string", "company": "string", "dates": "string", "responsibilities": ["string"]}
  ],
  "education": [
    {"institution": "string", "degree": "string", "dates": "string"}
  ],
  "certifications": ["string"],
  "projects": ["string"]
}

Return ONLY the JSON object — nothing else, no code fences."#;
