use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::null_as_default;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    Unread,
    Read,
    Archived,
    Deleted,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Unread => "unread",
            MessageStatus::Read => "read",
            MessageStatus::Archived => "archived",
            MessageStatus::Deleted => "deleted",
        }
    }

    /// Read/unread toggle: unread becomes read, everything else becomes unread
    pub fn toggled(&self) -> Self {
        match self {
            MessageStatus::Unread => MessageStatus::Read,
            _ => MessageStatus::Unread,
        }
    }
}

/// An inbound contact-form message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sender_email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: MessageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn is_unread(&self) -> bool {
        self.status == MessageStatus::Unread
    }
}

/// Apply a status change to the matching message in a local list
pub fn apply_status(messages: &mut [Message], id: &str, status: MessageStatus) -> bool {
    match messages.iter_mut().find(|m| m.id == id) {
        Some(message) => {
            message.status = status;
            true
        }
        None => false,
    }
}

/// Status-update responses come back in a few shapes; anything else means
/// the server accepted the requested status.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StatusEnvelope {
    Direct { status: MessageStatus },
    Nested { message: StatusOnly },
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusOnly {
    status: MessageStatus,
}

impl StatusEnvelope {
    pub(crate) fn status_or(self, requested: MessageStatus) -> MessageStatus {
        match self {
            StatusEnvelope::Direct { status } => status,
            StatusEnvelope::Nested { message } => message.status,
            StatusEnvelope::Other(_) => requested,
        }
    }
}
