use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_as_default, ImageUpload};
use crate::api::{ApiError, FormField};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<String>,
    /// Any other network the owner has added
    #[serde(flatten)]
    pub other: BTreeMap<String, Option<String>>,
}

impl SocialLinks {
    /// Non-empty links as (network, url), known networks first
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let known = [
            ("github", &self.github),
            ("linkedin", &self.linkedin),
            ("facebook", &self.facebook),
            ("gitlab", &self.gitlab),
        ];
        known
            .into_iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
            .chain(
                self.other
                    .iter()
                    .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v))),
            )
            .filter(|(_, v)| !v.trim().is_empty())
            .collect()
    }
}

/// The dashboard owner's profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profile_picture_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url_public_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub social_links: SocialLinks,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Name to greet the user with, falling back to the email address
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }

    /// Whether the record names an account at all
    pub fn has_identity(&self) -> bool {
        !self.id.trim().is_empty() || !self.email.trim().is_empty()
    }
}

/// Profile endpoints answer either with the bare profile or `{ "user": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProfileEnvelope {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

impl ProfileEnvelope {
    /// Every field is defaulted, so any object decodes as `Bare`.
    /// One without `_id` or `email` is not a profile.
    pub(crate) fn into_profile(self) -> Result<UserProfile, ApiError> {
        let user = match self {
            ProfileEnvelope::Wrapped { user } | ProfileEnvelope::Bare(user) => user,
        };
        if user.has_identity() {
            Ok(user)
        } else {
            Err(ApiError::InvalidResponse("profile has no _id or email".to_string()))
        }
    }
}

/// Changes to send with `PUT /profile`. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
    #[serde(skip)]
    pub profile_picture: Option<ImageUpload>,
}

impl ProfileUpdate {
    /// Update carrying every editable field of `profile`
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            full_name: Some(profile.full_name.clone()),
            email: None,
            job_title: Some(profile.job_title.clone()),
            bio: Some(profile.bio.clone()),
            social_links: Some(profile.social_links.clone()),
            profile_picture: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Multipart rendition, used when an avatar is attached.
    /// `socialLinks` travels as a JSON string, the way the server expects it.
    pub(crate) fn into_form(self) -> Result<Vec<FormField>, serde_json::Error> {
        let mut fields = Vec::new();
        if let Some(v) = self.full_name {
            fields.push(FormField::text("fullName", v));
        }
        if let Some(v) = self.email {
            fields.push(FormField::text("email", v));
        }
        if let Some(v) = self.job_title {
            fields.push(FormField::text("jobTitle", v));
        }
        if let Some(v) = self.bio {
            fields.push(FormField::text("bio", v));
        }
        if let Some(links) = self.social_links {
            fields.push(FormField::text("socialLinks", serde_json::to_string(&links)?));
        }
        if let Some(picture) = self.profile_picture {
            fields.push(picture.into_field("profilePicture"));
        }
        Ok(fields)
    }
}
