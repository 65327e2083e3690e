// Job Ranker LLM prompt templates.

pub const MATCH_SYSTEM: &str = "\
You are an experienced technical recruiter judging how well a candidate fits a job. \
You MUST respond with valid JSON only — no markdown fences, no explanations outside the JSON. \
Base your judgement only on the resume data and job description you are given.";

/// Match scoring prompt. Replace `{resume_json}` and `{job_description}` before sending.
pub const MATCH_PROMPT: &str = r#"Based on this resume data:
{resume_json}

And this job description:
{job_description}

Rate the match from 1-10 and explain why.

OUTPUT SCHEMA (return exactly this structure):
{
  "score": <integer between 1 and 10>,
  "explanation": "<one or two sentences>"
}"#;
