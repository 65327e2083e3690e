use std::path::Path;

use tracing::{debug, warn};

use crate::apply::fields::FieldKind;
use crate::apply::mapper::FieldAssignment;
use crate::browser::{BrowserError, ElementDriver};
use crate::config::Pacing;
use crate::errors::AppError;

/// What filling a single field did to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillAction {
    Typed,
    Uploaded,
    Clicked,
    /// Checkbox already in the requested state, or a radio whose value differs.
    Unchanged,
    Selected(String),
    /// No select option resembles the value.
    NoOption,
    /// Control kind that is never written to.
    Ignored,
}

/// Tally of one form fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    pub filled: usize,
    pub failed: usize,
}

/// Checkbox answers that mean "tick it".
pub fn is_affirmative(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "yes" | "true" | "1")
}

/// Option to pick for `value`: exact text first, then the first non-blank option
/// whose lowercase text contains the value or is contained in it.
pub fn choose_option<'a>(options: &'a [String], value: &str) -> Option<&'a str> {
    if let Some(exact) = options.iter().find(|o| o.as_str() == value) {
        return Some(exact.as_str());
    }

    let wanted = value.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    options
        .iter()
        .find(|option| {
            let option = option.trim().to_lowercase();
            !option.is_empty() && (wanted.contains(&option) || option.contains(&wanted))
        })
        .map(String::as_str)
}

fn is_resume_upload(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("resume") || name.contains("cv")
}

/// Writes one mapped value into its control.
pub async fn fill_field<E: ElementDriver>(
    assignment: &FieldAssignment<E>,
    resume_path: &Path,
) -> Result<FillAction, AppError> {
    let field = &assignment.field;
    let value = assignment.value.as_str();
    let fail = |e: BrowserError| AppError::FieldFill {
        field: field.display_name().to_string(),
        reason: e.to_string(),
    };
    let element = &field.element;

    match &field.kind {
        FieldKind::Text => {
            element.clear().await.map_err(fail)?;
            element.type_text(value).await.map_err(fail)?;
            Ok(FillAction::Typed)
        }
        FieldKind::File if is_resume_upload(&field.name) => {
            element.upload_file(resume_path).await.map_err(fail)?;
            Ok(FillAction::Uploaded)
        }
        FieldKind::File => Ok(FillAction::Ignored),
        FieldKind::Checkbox => {
            let target = is_affirmative(value);
            if element.is_checked().await.map_err(fail)? == target {
                return Ok(FillAction::Unchanged);
            }
            element.click().await.map_err(fail)?;
            Ok(FillAction::Clicked)
        }
        FieldKind::Radio => {
            let own_value = element.attribute("value").await.map_err(fail)?;
            if own_value.as_deref() != Some(value) {
                return Ok(FillAction::Unchanged);
            }
            element.click().await.map_err(fail)?;
            Ok(FillAction::Clicked)
        }
        FieldKind::Select => {
            let options = element.option_texts().await.map_err(fail)?;
            let Some(choice) = choose_option(&options, value) else {
                return Ok(FillAction::NoOption);
            };
            element.select_option(choice).await.map_err(fail)?;
            Ok(FillAction::Selected(choice.to_string()))
        }
        FieldKind::Other(_) => Ok(FillAction::Ignored),
    }
}

/// Fills every assignment in order, pausing after each one. A field that fails
/// is logged and counted; the rest of the form is still filled.
pub async fn fill_form<E: ElementDriver>(
    assignments: &[FieldAssignment<E>],
    resume_path: &Path,
    pacing: &Pacing,
) -> FillReport {
    let mut report = FillReport::default();

    for assignment in assignments {
        match fill_field(assignment, resume_path).await {
            Ok(action) => {
                debug!("{}: {action:?}", assignment.field.display_name());
                report.filled += 1;
            }
            Err(e) => {
                warn!("Error filling field: {e}");
                report.failed += 1;
            }
        }
        tokio::time::sleep(pacing.field_delay).await;
    }

    report
}
