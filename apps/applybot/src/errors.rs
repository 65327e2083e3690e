use thiserror::Error;

use crate::browser::BrowserError;
use crate::llm_client::LlmError;
use crate::resume::ExtractionError;

/// Application-level error type.
///
/// Only `FatalSetup` ends a run. Every other variant is caught by the component
/// that owns the unit of work (a board search, a posting, a form field) and
/// turned into a log line plus a skip.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Setup failed: {0}")]
    FatalSetup(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(#[from] LlmError),

    #[error("Could not fill field '{field}': {reason}")]
    FieldFill { field: String, reason: String },

    #[error("No submit control found on {0}")]
    SubmissionNotFound(String),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        AppError::FatalSetup(e.to_string())
    }
}
