// Resume Extractor: document text → oracle → ResumeProfile.

pub mod extract;
pub mod prompts;

pub use extract::{extract_profile, ExtractionError, PdfTextExtractor, TextExtractor};
