//! Application automation: discover a form's fields, ask the oracle what goes
//! in each, fill them, submit.

pub mod fields;
pub mod filler;
pub mod mapper;
pub mod prompts;
pub mod submit;

use tracing::info;

use crate::browser::PageDriver;
use crate::config::Pacing;
use crate::errors::AppError;
use crate::llm_client::Oracle;
use crate::models::ResumeProfile;

pub use mapper::MappingStrategy;
pub use submit::SubmissionOutcome;

/// Fills and submits application forms on one browser page.
pub struct ApplicationAutomator<'a, P: PageDriver> {
    page: &'a P,
    oracle: &'a dyn Oracle,
    profile: &'a ResumeProfile,
    pacing: &'a Pacing,
    strategy: MappingStrategy,
}

impl<'a, P: PageDriver> ApplicationAutomator<'a, P> {
    pub fn new(
        page: &'a P,
        oracle: &'a dyn Oracle,
        profile: &'a ResumeProfile,
        pacing: &'a Pacing,
        strategy: MappingStrategy,
    ) -> Self {
        Self {
            page,
            oracle,
            profile,
            pacing,
            strategy,
        }
    }

    /// Runs one application attempt against `url`.
    ///
    /// Field-level problems are absorbed by the mapper and filler; only failing
    /// to load or query the page, or to click the submit control, is an error.
    pub async fn fill_application(&self, url: &str) -> Result<SubmissionOutcome, AppError> {
        self.page.goto(url).await?;

        let found = fields::discover_fields(self.page).await?;
        let found_count = found.len();
        let assignments = mapper::map_fields(self.oracle, self.profile, found, self.strategy).await;

        let report =
            filler::fill_form(&assignments, &self.profile.source_path, self.pacing).await;
        info!(
            "Filled {} of {found_count} fields ({} mapped, {} failed)",
            report.filled,
            assignments.len(),
            report.failed
        );

        submit::submit_application(self.page, url, self.pacing).await
    }
}
