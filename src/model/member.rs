//! Team member model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a member within a single team.
///
/// A person who participates in several teams holds one membership record
/// per team, each with its own role and score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Admin,
    #[default]
    Member,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRole::Admin => write!(f, "ADMIN"),
            MemberRole::Member => write!(f, "MEMBER"),
        }
    }
}

/// A team participant with a running reputation score.
///
/// The score is the sum of every scoring event ever applied to this
/// membership - it is never recomputed from task history, only
/// incremented and decremented, which is what makes deletion-time
/// reversal mandatory bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    /// External contact handle, e.g. "@amira"
    pub handle: String,
    /// Direct-message address with the external messenger, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub role: MemberRole,
    /// Signed and unbounded; may go negative
    pub reputation_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Member {
    /// Create a member with the given starting score.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        handle: impl Into<String>,
        role: MemberRole,
        initial_score: i64,
    ) -> Self {
        let handle = handle.into();
        Self {
            id: id.into(),
            name: name.into(),
            handle: if handle.starts_with('@') {
                handle
            } else {
                format!("@{handle}")
            },
            chat_id: None,
            role,
            reputation_score: initial_score,
            avatar: None,
        }
    }

    /// Set the direct-message address.
    #[must_use]
    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = Some(chat_id.into());
        self
    }

    /// Check if this member holds admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin
    }

    /// Check if an inbound sender identity refers to this member.
    ///
    /// Matches on the contact handle or the direct-message address,
    /// whichever the reply source could supply.
    #[must_use]
    pub fn matches_sender(&self, handle: Option<&str>, chat_id: Option<&str>) -> bool {
        if let Some(h) = handle {
            if self.handle == h {
                return true;
            }
        }
        if let (Some(incoming), Some(own)) = (chat_id, self.chat_id.as_deref()) {
            if incoming == own {
                return true;
            }
        }
        false
    }
}
