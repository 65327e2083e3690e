use tokio::time::Instant;
use tracing::{info, warn};

use crate::browser::{ElementDriver, PageDriver};
use crate::config::Pacing;
use crate::errors::AppError;

/// Controls that submit a form by type.
pub const SUBMIT_SELECTOR: &str = "button[type='submit'], input[type='submit']";
/// Button texts that identify a submit control when no typed one exists.
const SUBMIT_TEXTS: [&str; 2] = ["Apply", "Submit"];
/// Page texts that indicate the application went through.
const CONFIRMATION_MARKERS: [&str; 3] = ["Thank you", "Success", "Confirmation"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// A confirmation message appeared after submitting.
    Confirmed,
    /// Submitted, but no confirmation appeared before the timeout.
    Unconfirmed,
    /// The page had nothing to click.
    NoSubmitControl,
}

impl SubmissionOutcome {
    pub fn is_success(self) -> bool {
        !matches!(self, SubmissionOutcome::NoSubmitControl)
    }
}

/// The control to click: the first submit-typed button or input, otherwise the
/// first button whose text mentions applying or submitting.
pub async fn find_submit_control<P: PageDriver>(
    page: &P,
    url: &str,
) -> Result<P::Element, AppError> {
    if let Some(control) = page.find_all(SUBMIT_SELECTOR).await?.into_iter().next() {
        return Ok(control);
    }

    for button in page.find_all("button").await? {
        let Ok(text) = button.text().await else {
            continue;
        };
        if SUBMIT_TEXTS.iter().any(|t| text.contains(t)) {
            return Ok(button);
        }
    }

    Err(AppError::SubmissionNotFound(url.to_string()))
}

/// Clicks the submit control and waits for a confirmation message.
///
/// A missing control is an outcome, not an error; browser failures while
/// clicking are errors.
pub async fn submit_application<P: PageDriver>(
    page: &P,
    url: &str,
    pacing: &Pacing,
) -> Result<SubmissionOutcome, AppError> {
    let control = match find_submit_control(page, url).await {
        Ok(control) => control,
        Err(AppError::SubmissionNotFound(url)) => {
            warn!("No submit control found on {url}");
            return Ok(SubmissionOutcome::NoSubmitControl);
        }
        Err(e) => return Err(e),
    };

    control.click().await?;

    if wait_for_confirmation(page, pacing).await {
        info!("Application confirmed");
        Ok(SubmissionOutcome::Confirmed)
    } else {
        warn!(
            "No confirmation within {:?}; assuming the application went through",
            pacing.confirmation_timeout
        );
        Ok(SubmissionOutcome::Unconfirmed)
    }
}

/// Polls the page text until a confirmation marker shows up or the timeout passes.
/// Always checks at least once.
pub async fn wait_for_confirmation<P: PageDriver>(page: &P, pacing: &Pacing) -> bool {
    let deadline = Instant::now() + pacing.confirmation_timeout;
    loop {
        if let Ok(text) = page.page_text().await {
            if CONFIRMATION_MARKERS.iter().any(|m| text.contains(m)) {
                return true;
            }
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(pacing.confirmation_poll).await;
    }
}
