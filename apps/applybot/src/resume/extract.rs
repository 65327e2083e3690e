use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::render_prompt;
use crate::llm_client::{complete_json, LlmError, Oracle};
use crate::models::ResumeProfile;
use crate::resume::prompts::{RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM};

/// Everything that can go wrong turning a resume document into a profile.
/// All of these are fatal for a run.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not read resume {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("Resume {path} contains no extractable text")]
    NoText { path: PathBuf },

    #[error("Resume data could not be parsed: {0}")]
    Parse(String),

    #[error("Resume extraction call failed: {0}")]
    Oracle(LlmError),
}

/// Document text extraction. Must distinguish "could not open/decode" from
/// "opened fine but there is no text in it".
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// PDF text extraction via `pdf-extract`.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|e| ExtractionError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            ExtractionError::Unreadable {
                path: path.to_path_buf(),
                reason: format!("PDF extraction error: {e}"),
            }
        })?;

        if text.trim().is_empty() {
            return Err(ExtractionError::NoText {
                path: path.to_path_buf(),
            });
        }
        Ok(text)
    }
}

/// Reads the resume at `path` and asks the oracle to structure it.
///
/// One oracle call, no retry. A response that is not a JSON object is a
/// `Parse` error; the caller is expected to abort the run on any error here.
pub async fn extract_profile(
    path: &Path,
    extractor: &dyn TextExtractor,
    oracle: &dyn Oracle,
) -> Result<ResumeProfile, ExtractionError> {
    let text = extractor.extract(path)?;
    info!("Extracted {} characters from {}", text.len(), path.display());

    let prompt = render_prompt(RESUME_PARSE_PROMPT, &[("resume_text", &text)]);
    let value: Value = complete_json(oracle, &prompt, RESUME_PARSE_SYSTEM)
        .await
        .map_err(|e| match e {
            LlmError::Parse(e) => ExtractionError::Parse(e.to_string()),
            LlmError::EmptyContent => ExtractionError::Parse("empty response".to_string()),
            other => ExtractionError::Oracle(other),
        })?;

    if !value.is_object() {
        return Err(ExtractionError::Parse(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }

    let mut profile: ResumeProfile =
        serde_json::from_value(value).map_err(|e| ExtractionError::Parse(e.to_string()))?;
    profile.source_path = absolute_path(path);

    if profile.name.is_empty() || profile.email.is_empty() {
        warn!("Resume profile is missing a name or email; forms may be filled incompletely");
    }
    info!(
        "Parsed resume for '{}': {} skills, {} jobs, {} education entries",
        profile.name,
        profile.skills.len(),
        profile.work_experience.len(),
        profile.education.len()
    );

    Ok(profile)
}

fn absolute_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
