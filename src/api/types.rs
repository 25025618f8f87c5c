use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Filename timestamp format assigned by the backend on create.
const TRANSCRIPT_STEM_FORMAT: &str = "%Y-%m%d-%H%M%S";

/// Who produced a message. The backend speaks exactly two roles:
/// `user` for human turns and `system` for completion replies.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "system")]
    System,
}

/// One conversation turn. Immutable once appended; ordering within a
/// transcript is the conversation order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Message {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Lightweight index entry for the sidebar. The filename IS the transcript
/// identity; everything else here is derived for display only.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub filename: String,
}

impl TranscriptEntry {
    /// Name shown in the sidebar: the stored filename minus the conventional
    /// `.json` suffix. The full filename remains the identity.
    pub fn display_name(&self) -> &str {
        self.filename
            .strip_suffix(".json")
            .unwrap_or(&self.filename)
    }

    /// Parses the timestamp stem the backend assigns on create. Returns
    /// `None` for filenames that don't follow the convention.
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(self.display_name(), TRANSCRIPT_STEM_FORMAT).ok()
    }
}
