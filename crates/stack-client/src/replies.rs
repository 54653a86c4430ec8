//! Scripted auto-replies for the demo. Not a product feature: a rule maps a
//! channel id to a function that may answer a freshly posted message.

use std::collections::HashMap;
use std::sync::Arc;

use stack_store::Repository;
use stack_types::models::{Message, MessageDraft, DM_CHANNEL_PREFIX};

pub type ReplyFn = dyn Fn(&Message) -> Option<MessageDraft> + Send + Sync;

#[derive(Clone, Default)]
pub struct ReplyRules {
    rules: HashMap<String, Arc<ReplyFn>>,
}

impl ReplyRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule<F>(mut self, channel_id: impl Into<String>, reply: F) -> Self
    where
        F: Fn(&Message) -> Option<MessageDraft> + Send + Sync + 'static,
    {
        self.rules.insert(channel_id.into(), Arc::new(reply));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn reply_to(&self, message: &Message) -> Option<MessageDraft> {
        self.rules
            .get(&message.channel_id)
            .and_then(|rule| rule(message))
    }

    /// Every direct-message partner acknowledges messages sent to them.
    pub fn demo(repo: &dyn Repository) -> Self {
        let users = repo.users();

        repo.direct_message_channels()
            .into_iter()
            .fold(Self::new(), |rules, channel| {
                let partner_id = channel.id[DM_CHANNEL_PREFIX.len()..].to_string();
                let users = users.clone();
                let channel_id = channel.id.clone();

                rules.with_rule(channel.id, move |message| {
                    if message.user_id == partner_id {
                        return None;
                    }
                    let sender = users
                        .iter()
                        .find(|u| u.id == message.user_id)
                        .and_then(|u| u.name.split_whitespace().next())
                        .unwrap_or("there");

                    Some(MessageDraft {
                        user_id: partner_id.clone(),
                        channel_id: channel_id.clone(),
                        content: format!("Thanks @{}! I'll get back to you shortly.", sender),
                    })
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stack_store::MemoryStore;

    fn message(user_id: &str, channel_id: &str) -> Message {
        Message {
            id: "m_test".into(),
            user_id: user_id.into(),
            channel_id: channel_id.into(),
            timestamp: Utc::now(),
            content: "hello".into(),
        }
    }

    #[test]
    fn demo_rules_answer_in_direct_messages_only() {
        let store = MemoryStore::seeded();
        let rules = ReplyRules::demo(&store);

        let reply = rules.reply_to(&message("u01", "dm_u03")).unwrap();
        assert_eq!(reply.user_id, "u03");
        assert_eq!(reply.channel_id, "dm_u03");
        assert_eq!(reply.content, "Thanks @Alice! I'll get back to you shortly.");

        assert!(rules.reply_to(&message("u01", "c01")).is_none());
        // The partner never answers themselves
        assert!(rules.reply_to(&message("u03", "dm_u03")).is_none());
    }

    #[test]
    fn custom_rule_table() {
        let rules = ReplyRules::new().with_rule("c03", |m: &Message| {
            Some(MessageDraft {
                user_id: "u02".into(),
                channel_id: m.channel_id.clone(),
                content: "🌮".into(),
            })
        });

        assert!(rules.reply_to(&message("u01", "c03")).is_some());
        assert!(rules.reply_to(&message("u01", "c02")).is_none());
        assert!(ReplyRules::new().is_empty());
    }
}
