//! Data models for portfolio content.
//!
//! This module contains the wire types exchanged with the portfolio API:
//!
//! - `UserProfile`, `ProfileUpdate`: the dashboard owner's profile
//! - `Project`, `ProjectDraft`: portfolio projects (tags normalized on decode)
//! - `Skill`, `NewSkill`: skills grouped by category
//! - `Employment`, `EmploymentDraft`: work history with bullet descriptions
//! - `Message`, `MessageStatus`: inbound contact messages
//! - `DashboardStats`: derived content counts

pub mod dashboard;
pub mod employment;
pub mod message;
pub mod project;
pub mod skill;
pub mod user;
pub mod validation;

use serde::{Deserialize, Deserializer};

pub use dashboard::DashboardStats;
pub use employment::{split_bullets, Employment, EmploymentDraft};
pub use message::{apply_status, Message, MessageStatus};
pub use project::{parse_tags, Project, ProjectDraft};
pub use skill::{group_by_category, NewSkill, Skill};
pub use user::{ProfileUpdate, SocialLinks, UserProfile};
pub use validation::{ImageUpload, ValidationError};

/// Treat an explicit `null` the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
