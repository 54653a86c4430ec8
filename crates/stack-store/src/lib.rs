pub mod error;
pub mod fixtures;
pub mod queries;

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use stack_types::api::{SearchCriteria, Suggestions};
use stack_types::models::{AiSummary, Channel, Message, MessageDraft, User};

pub use error::StoreError;

/// Read/append access to workspace data.
///
/// Implementors only supply the raw collections; lookups, search and the
/// validated write path are provided on top of them so every backing store
/// answers queries the same way.
pub trait Repository: Send + Sync {
    /// The signed-in user. Never offered as a direct-message partner.
    fn current_user_id(&self) -> &str;

    fn users(&self) -> Vec<User>;

    /// Named channels only; direct-message channels are derived from users.
    fn named_channels(&self) -> Vec<Channel>;

    /// Snapshot of all messages in append order.
    fn messages(&self) -> Vec<Message>;

    fn summaries(&self) -> Vec<AiSummary>;

    /// Append an already validated message.
    fn append(&self, message: Message);

    // -- Provided --

    fn user(&self, user_id: &str) -> Option<User> {
        self.users().into_iter().find(|u| u.id == user_id)
    }

    fn direct_message_channels(&self) -> Vec<Channel> {
        queries::direct_message_channels(&self.users(), self.current_user_id())
    }

    /// Named channels followed by the direct-message channels.
    fn channels(&self) -> Vec<Channel> {
        let mut channels = self.named_channels();
        channels.extend(self.direct_message_channels());
        channels
    }

    fn channel(&self, channel_id: &str) -> Option<Channel> {
        self.channels().into_iter().find(|c| c.id == channel_id)
    }

    fn fetch_messages(&self, channel_id: &str) -> Vec<Message> {
        queries::channel_messages(&self.messages(), channel_id)
    }

    fn fetch_summary(&self, channel_id: &str) -> Option<AiSummary> {
        self.summaries().into_iter().find(|s| s.channel_id == channel_id)
    }

    fn search(&self, criteria: &SearchCriteria) -> Vec<Message> {
        queries::search(&self.messages(), &self.users(), criteria)
    }

    fn suggest(&self, query: &str) -> Suggestions {
        queries::suggest(&self.channels(), &self.messages(), query)
    }

    /// Validate the draft's references, then assign an id and timestamp and
    /// append it.
    fn post_message(&self, draft: MessageDraft) -> Result<Message, StoreError> {
        if self.user(&draft.user_id).is_none() {
            return Err(StoreError::UserNotFound(draft.user_id));
        }
        if self.channel(&draft.channel_id).is_none() {
            return Err(StoreError::ChannelNotFound(draft.channel_id));
        }

        let message = Message {
            id: new_message_id(),
            user_id: draft.user_id,
            channel_id: draft.channel_id,
            timestamp: Utc::now(),
            content: draft.content,
        };

        self.append(message.clone());
        debug!("Posted {} to {}", message.id, message.channel_id);
        Ok(message)
    }
}

/// Random ids so that messages created in the same instant never collide.
pub fn new_message_id() -> String {
    format!("m_{}", Uuid::new_v4().simple())
}

/// Process-memory store. Fixture collections are immutable; only the
/// message list grows.
pub struct MemoryStore {
    current_user_id: String,
    users: Vec<User>,
    channels: Vec<Channel>,
    messages: Mutex<Vec<Message>>,
    summaries: Vec<AiSummary>,
}

impl MemoryStore {
    pub fn new(
        current_user_id: impl Into<String>,
        users: Vec<User>,
        channels: Vec<Channel>,
        messages: Vec<Message>,
        summaries: Vec<AiSummary>,
    ) -> Self {
        Self {
            current_user_id: current_user_id.into(),
            users,
            channels,
            messages: Mutex::new(messages),
            summaries,
        }
    }

    /// Store seeded with the demo workspace.
    pub fn seeded() -> Self {
        let store = Self::new(
            fixtures::CURRENT_USER_ID,
            fixtures::users(),
            fixtures::channels(),
            fixtures::messages(),
            fixtures::summaries(),
        );
        info!(
            "Seeded store: {} users, {} channels, {} messages",
            store.users.len(),
            store.channels.len(),
            store.with_messages(|m| m.len())
        );
        store
    }

    pub fn with_messages<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut Vec<Message>) -> T,
    {
        // The list is append-only, so a panic mid-push cannot leave it torn.
        let mut messages: MutexGuard<'_, Vec<Message>> =
            self.messages.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut messages)
    }
}

impl Repository for MemoryStore {
    fn current_user_id(&self) -> &str {
        &self.current_user_id
    }

    fn users(&self) -> Vec<User> {
        self.users.clone()
    }

    fn named_channels(&self) -> Vec<Channel> {
        self.channels.clone()
    }

    fn messages(&self) -> Vec<Message> {
        self.with_messages(|m| m.clone())
    }

    fn summaries(&self) -> Vec<AiSummary> {
        self.summaries.clone()
    }

    fn append(&self, message: Message) {
        self.with_messages(|m| m.push(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(user_id: &str, channel_id: &str, content: &str) -> MessageDraft {
        MessageDraft {
            user_id: user_id.to_string(),
            channel_id: channel_id.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn post_message_assigns_fresh_id_and_appends() {
        let store = MemoryStore::seeded();
        let before = store.messages();

        let posted = store.post_message(draft("u01", "c01", "hi")).unwrap();
        assert_eq!(posted.user_id, "u01");
        assert_eq!(posted.channel_id, "c01");
        assert_eq!(posted.content, "hi");
        assert!(before.iter().all(|m| m.id != posted.id));
        assert!(before.iter().all(|m| m.timestamp < posted.timestamp));

        let thread = store.fetch_messages("c01");
        assert_eq!(thread.last(), Some(&posted));
    }

    #[test]
    fn rapid_posts_get_distinct_ids() {
        let store = MemoryStore::seeded();
        let a = store.post_message(draft("u01", "c02", "one")).unwrap();
        let b = store.post_message(draft("u01", "c02", "two")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn post_message_rejects_unknown_references() {
        let store = MemoryStore::seeded();

        let err = store.post_message(draft("u99", "c01", "hi")).unwrap_err();
        assert_eq!(err, StoreError::UserNotFound("u99".into()));

        let err = store.post_message(draft("u01", "nope", "hi")).unwrap_err();
        assert_eq!(err, StoreError::ChannelNotFound("nope".into()));

        assert_eq!(store.messages().len(), fixtures::messages().len());
    }

    #[test]
    fn direct_message_channels_accept_posts() {
        let store = MemoryStore::seeded();
        let posted = store.post_message(draft("u01", "dm_u02", "ping")).unwrap();
        assert_eq!(store.fetch_messages("dm_u02"), vec![posted]);

        // No channel pairs the current user with themselves
        assert!(store.channel("dm_u01").is_none());
    }

    #[test]
    fn channels_list_named_then_direct() {
        let store = MemoryStore::seeded();
        let ids: Vec<String> = store.channels().into_iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec!["c01", "c02", "c03", "c04", "dm_u02", "dm_u03", "dm_u04", "dm_u05"]
        );
    }

    #[test]
    fn fetch_summary_present_and_absent() {
        let store = MemoryStore::seeded();
        let summary = store.fetch_summary("c01").unwrap();
        assert_eq!(summary.channel_id, "c01");
        assert!(summary.content.starts_with("# Project Alpha"));

        assert_eq!(store.fetch_summary("unknown"), None);
    }

    #[test]
    fn fetch_messages_keeps_store_order() {
        let store = MemoryStore::seeded();
        let ids: Vec<String> = store.fetch_messages("c02").into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["m16", "m17"]);
        assert!(store.fetch_messages("unknown").is_empty());
    }
}
