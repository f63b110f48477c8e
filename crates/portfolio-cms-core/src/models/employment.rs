use serde::{Deserialize, Deserializer, Serialize};

use super::validation::require;
use super::{null_as_default, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employment {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_date: String,
    /// One entry per bullet point
    #[serde(default, deserialize_with = "deserialize_bullets")]
    pub description: Vec<String>,
}

impl Employment {
    /// "Jan 2020 – Present" style period; an empty end date means current
    pub fn period(&self) -> String {
        let end = if self.end_date.trim().is_empty() {
            "Present"
        } else {
            self.end_date.trim()
        };
        format!("{} – {}", self.start_date.trim(), end)
    }
}

/// Turn multi-line text into trimmed, non-empty bullet lines
pub fn split_bullets(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Older entries stored the description as a single string
fn deserialize_bullets<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Lines(Vec<String>),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Lines(lines)) => lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        Some(Raw::Text(text)) => split_bullets(&text),
        None => Vec::new(),
    })
}

/// Form input for `POST /employment/create` and `PUT /employment/update/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmploymentDraft {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    /// Multi-line text, one bullet per line
    pub description: String,
}

/// Wire body built from a validated draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EmploymentPayload {
    title: String,
    company: String,
    location: String,
    start_date: String,
    end_date: String,
    description: Vec<String>,
}

impl EmploymentDraft {
    pub fn from_employment(entry: &Employment) -> Self {
        Self {
            title: entry.title.clone(),
            company: entry.company.clone(),
            location: entry.location.clone(),
            start_date: entry.start_date.clone(),
            end_date: entry.end_date.clone(),
            description: entry.description.join("\n"),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "Title")?;
        require(&self.company, "Company")
    }

    pub(crate) fn to_payload(&self) -> Result<EmploymentPayload, ValidationError> {
        self.validate()?;
        Ok(EmploymentPayload {
            title: self.title.trim().to_string(),
            company: self.company.trim().to_string(),
            location: self.location.trim().to_string(),
            start_date: self.start_date.trim().to_string(),
            end_date: self.end_date.trim().to_string(),
            description: split_bullets(&self.description),
        })
    }
}
