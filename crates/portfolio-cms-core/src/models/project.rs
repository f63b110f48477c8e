use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::validation::require;
use super::{null_as_default, ImageUpload, ValidationError};
use crate::api::FormField;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    /// Always normalized: trimmed, no empty entries
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_public_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn tags_display(&self) -> String {
        self.tags.join(", ")
    }
}

/// Split a comma-separated tag string into trimmed, non-empty tags
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tags arrive either as an array or as one comma-separated string
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTags {
    List(Vec<serde_json::Value>),
    Joined(String),
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let tags = match Option::<RawTags>::deserialize(deserializer)? {
        Some(RawTags::List(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            })
            .filter(|t| !t.is_empty())
            .collect(),
        Some(RawTags::Joined(joined)) => parse_tags(&joined),
        None => Vec::new(),
    };
    Ok(tags)
}

/// Create responses are either the project or `{ "project": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProjectEnvelope {
    Wrapped { project: Project },
    Bare(Project),
}

impl ProjectEnvelope {
    pub(crate) fn into_project(self) -> Project {
        match self {
            ProjectEnvelope::Wrapped { project } | ProjectEnvelope::Bare(project) => project,
        }
    }
}

/// Form input for creating or editing a project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub category: String,
    pub description: String,
    /// Comma-separated, as typed
    pub tags: String,
    pub live_url: String,
    pub repo_url: String,
    pub image: Option<ImageUpload>,
}

impl ProjectDraft {
    /// Prefill a draft for editing `project`
    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            category: project.category.clone(),
            description: project.description.clone(),
            tags: project.tags_display(),
            live_url: project.live_url.clone().unwrap_or_default(),
            repo_url: project.repo_url.clone().unwrap_or_default(),
            image: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "Title")?;
        require(&self.description, "Description")?;
        if parse_tags(&self.tags).is_empty() {
            return Err(ValidationError::MissingField("Tags"));
        }
        require(&self.category, "Category")
    }

    /// Whether saving this draft would change `project`
    pub fn differs_from(&self, project: &Project) -> bool {
        self.image.is_some()
            || self.title.trim() != project.title.trim()
            || self.category.trim() != project.category.trim()
            || self.description.trim() != project.description.trim()
            || parse_tags(&self.tags) != project.tags
            || self.live_url.trim() != project.live_url.as_deref().unwrap_or("").trim()
            || self.repo_url.trim() != project.repo_url.as_deref().unwrap_or("").trim()
    }

    /// Validate and render as a multipart form (`tags[]` once per tag)
    pub(crate) fn into_form(self) -> Result<Vec<FormField>, ValidationError> {
        self.validate()?;

        let mut fields = vec![
            FormField::text("title", self.title.trim()),
            FormField::text("category", self.category.trim()),
            FormField::text("description", self.description.trim()),
        ];
        fields.extend(parse_tags(&self.tags).into_iter().map(|t| FormField::text("tags[]", t)));
        fields.push(FormField::text("liveUrl", self.live_url.trim()));
        fields.push(FormField::text("repoUrl", self.repo_url.trim()));
        if let Some(image) = self.image {
            fields.push(image.into_field("image"));
        }
        Ok(fields)
    }
}
