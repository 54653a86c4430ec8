use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel ids starting with this prefix are synthetic one-to-one
/// conversations with another user (`dm_<user id>`).
pub const DM_CHANNEL_PREFIX: &str = "dm_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Channel {
    /// Build the synthetic direct-message channel paired with `user`.
    pub fn direct_message(user: &User) -> Self {
        Self {
            id: format!("{}{}", DM_CHANNEL_PREFIX, user.id),
            name: user.name.clone(),
            description: format!("Direct messages with {}", user.name),
        }
    }

    pub fn is_direct_message(&self) -> bool {
        is_direct_message_id(&self.id)
    }
}

pub fn is_direct_message_id(channel_id: &str) -> bool {
    channel_id.starts_with(DM_CHANNEL_PREFIX)
}

/// A posted chat message. `content` may embed `@name` mentions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user_id: String,
    pub channel_id: String,
    pub timestamp: DateTime<Utc>,
    pub content: String,
}

/// Everything needed to create a message; id and timestamp are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub user_id: String,
    pub channel_id: String,
    pub content: String,
}

/// Pre-generated channel summary. `content` uses a small Markdown subset:
/// `#`/`##`/`###` headings, `- ` bullets, `**bold**` spans and blank lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSummary {
    pub channel_id: String,
    pub content: String,
}
