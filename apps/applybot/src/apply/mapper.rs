use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::apply::fields::{FieldKind, FormField};
use crate::apply::prompts::{FIELD_MAP_PROMPT, FIELD_MAP_SYSTEM, FORM_MAP_PROMPT};
use crate::llm_client::prompts::{render_prompt, JSON_ONLY_SYSTEM, PROFILE_ONLY_INSTRUCTION};
use crate::llm_client::{complete_json, strip_code_fences, Oracle};
use crate::models::ResumeProfile;

/// Answer the oracle gives for a field that should stay untouched.
pub const SKIP_SENTINEL: &str = "SKIP";

/// How many oracle calls a form costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MappingStrategy {
    /// One call per field.
    #[default]
    PerField,
    /// One call for the whole form, answered as a JSON object keyed by field index.
    Batched,
}

/// The oracle's answer for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDecision {
    Fill(String),
    Skip,
}

impl FieldDecision {
    /// Reads a raw oracle answer. Blank answers and the sentinel (any case,
    /// optionally quoted or fenced) mean skip.
    pub fn parse(raw: &str) -> Self {
        let text = strip_code_fences(raw).trim();
        let text = strip_matching_quotes(text).trim();
        if text.is_empty() || text.eq_ignore_ascii_case(SKIP_SENTINEL) {
            FieldDecision::Skip
        } else {
            FieldDecision::Fill(text.to_string())
        }
    }
}

fn strip_matching_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// A field paired with the value to write into it.
#[derive(Debug, Clone)]
pub struct FieldAssignment<E> {
    pub field: FormField<E>,
    pub value: String,
}

/// Asks the oracle what to put in each field. Skipped and failed fields are
/// left out; the result keeps document order.
pub async fn map_fields<E>(
    oracle: &dyn Oracle,
    profile: &ResumeProfile,
    fields: Vec<FormField<E>>,
    strategy: MappingStrategy,
) -> Vec<FieldAssignment<E>> {
    let total = fields.len();
    let assignments = match strategy {
        MappingStrategy::PerField => map_per_field(oracle, profile, fields).await,
        MappingStrategy::Batched => map_batched(oracle, profile, fields).await,
    };
    debug!("Mapped {} of {total} fields", assignments.len());
    assignments
}

async fn map_per_field<E>(
    oracle: &dyn Oracle,
    profile: &ResumeProfile,
    fields: Vec<FormField<E>>,
) -> Vec<FieldAssignment<E>> {
    let resume_json = profile.to_prompt_json();
    let mut assignments = Vec::new();

    for field in fields {
        let prompt = render_prompt(
            FIELD_MAP_PROMPT,
            &[
                ("name", &field.name),
                ("id", &field.id),
                ("placeholder", &field.placeholder),
                ("label", &field.label),
                ("resume_json", &resume_json),
            ],
        );
        let prompt = format!("{prompt}\n\n{PROFILE_ONLY_INSTRUCTION}");

        match oracle.complete(&prompt, FIELD_MAP_SYSTEM).await {
            Ok(raw) => match FieldDecision::parse(&raw) {
                FieldDecision::Fill(value) => assignments.push(FieldAssignment { field, value }),
                FieldDecision::Skip => debug!("Skipping field '{}'", field.display_name()),
            },
            Err(e) => warn!("Could not map field '{}': {e}", field.display_name()),
        }
    }

    assignments
}

#[derive(Serialize)]
struct FieldDescriptor<'a> {
    index: usize,
    kind: &'a str,
    name: &'a str,
    id: &'a str,
    placeholder: &'a str,
    label: &'a str,
}

fn kind_name(kind: &FieldKind) -> &str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::File => "file",
        FieldKind::Checkbox => "checkbox",
        FieldKind::Radio => "radio",
        FieldKind::Select => "select",
        FieldKind::Other(other) => other,
    }
}

async fn map_batched<E>(
    oracle: &dyn Oracle,
    profile: &ResumeProfile,
    fields: Vec<FormField<E>>,
) -> Vec<FieldAssignment<E>> {
    if fields.is_empty() {
        return vec![];
    }

    let descriptors: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(index, f)| FieldDescriptor {
            index,
            kind: kind_name(&f.kind),
            name: &f.name,
            id: &f.id,
            placeholder: &f.placeholder,
            label: &f.label,
        })
        .collect();
    let fields_json = serde_json::to_string_pretty(&descriptors).unwrap_or_default();

    let prompt = render_prompt(
        FORM_MAP_PROMPT,
        &[("fields_json", &fields_json), ("resume_json", &profile.to_prompt_json())],
    );
    let prompt = format!("{prompt}\n\n{PROFILE_ONLY_INSTRUCTION}");

    let mut answers: HashMap<String, Value> =
        match complete_json(oracle, &prompt, JSON_ONLY_SYSTEM).await {
            Ok(answers) => answers,
            Err(e) => {
                warn!("Batched field mapping failed, leaving all {} fields empty: {e}", fields.len());
                return vec![];
            }
        };

    fields
        .into_iter()
        .enumerate()
        .filter_map(|(index, field)| {
            let raw = match answers.remove(&index.to_string())? {
                Value::String(s) => s,
                Value::Null => return None,
                other => other.to_string(),
            };
            match FieldDecision::parse(&raw) {
                FieldDecision::Fill(value) => Some(FieldAssignment { field, value }),
                FieldDecision::Skip => None,
            }
        })
        .collect()
}
