use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Structured resume data. Built once per run by the resume extractor and
/// treated as read-only afterwards: it is the only source of candidate facts
/// used for ranking and for filling forms.
///
/// Decoding is lenient per field: missing keys, nulls, numbers where text is
/// expected and malformed list items all reduce to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeProfile {
    #[serde(alias = "full_name", deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(alias = "phone_number", deserialize_with = "lenient::text")]
    pub phone: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(alias = "objective", deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::text_list")]
    pub skills: Vec<String>,
    #[serde(alias = "experience", deserialize_with = "lenient::entries")]
    pub work_experience: Vec<WorkEntry>,
    #[serde(deserialize_with = "lenient::entries")]
    pub education: Vec<EducationEntry>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub certifications: Vec<String>,
    #[serde(deserialize_with = "lenient::text_list")]
    pub projects: Vec<String>,
    /// Absolute path of the source document, used for resume file uploads.
    #[serde(skip)]
    pub source_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkEntry {
    #[serde(alias = "role", deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::text")]
    pub company: String,
    #[serde(deserialize_with = "lenient::text")]
    pub dates: String,
    #[serde(deserialize_with = "lenient::text_list")]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    #[serde(deserialize_with = "lenient::text")]
    pub institution: String,
    #[serde(deserialize_with = "lenient::text")]
    pub degree: String,
    #[serde(deserialize_with = "lenient::text")]
    pub dates: String,
}

impl ResumeProfile {
    /// JSON rendering embedded into oracle prompts. The source path is never included.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Field-level deserializers that accept whatever shape the oracle produced
/// and reduce it to the declared type instead of failing the whole profile.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(value_to_text(&Value::deserialize(d)?))
    }

    pub fn text_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let items = match Value::deserialize(d)? {
            Value::Array(items) => items,
            Value::Null => vec![],
            other => vec![other],
        };
        Ok(items
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect())
    }

    pub fn entries<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let items = match Value::deserialize(d)? {
            Value::Array(items) => items,
            _ => vec![],
        };
        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    fn value_to_text(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.trim().to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(items) => items
                .iter()
                .map(value_to_text)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            Value::Object(map) => map
                .values()
                .map(value_to_text)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" - "),
        }
    }
}
