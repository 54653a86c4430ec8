use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, warn};

use stack_store::{Repository, StoreError};
use stack_types::api::{SearchCriteria, Suggestions};
use stack_types::events::WorkspaceEvent;
use stack_types::models::{AiSummary, Channel, Message, MessageDraft, User};

use crate::replies::ReplyRules;

/// Artificial round-trip delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// Ordinary reads and writes
    pub read: Duration,
    /// Summary fetches, modelling a slower generation step
    pub summary: Duration,
    /// Search and suggestion queries
    pub search: Duration,
    /// Time before a scripted auto-reply shows up
    pub reply: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            read: Duration::from_millis(500),
            summary: Duration::from_millis(1500),
            search: Duration::from_millis(300),
            reply: Duration::from_millis(1000),
        }
    }
}

impl Latency {
    pub fn none() -> Self {
        Self {
            read: Duration::ZERO,
            summary: Duration::ZERO,
            search: Duration::ZERO,
            reply: Duration::ZERO,
        }
    }

    /// Defaults overridden by `STACK_READ_DELAY_MS`, `STACK_SUMMARY_DELAY_MS`,
    /// `STACK_SEARCH_DELAY_MS` and `STACK_REPLY_DELAY_MS`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            read: env_millis("STACK_READ_DELAY_MS", defaults.read)?,
            summary: env_millis("STACK_SUMMARY_DELAY_MS", defaults.summary)?,
            search: env_millis("STACK_SEARCH_DELAY_MS", defaults.search)?,
            reply: env_millis("STACK_REPLY_DELAY_MS", defaults.reply)?,
        })
    }
}

fn env_millis(key: &str, default: Duration) -> Result<Duration> {
    match std::env::var(key) {
        Ok(raw) => {
            let ms: u64 = raw
                .parse()
                .with_context(|| format!("{} must be a number of milliseconds, got {:?}", key, raw))?;
            Ok(Duration::from_millis(ms))
        }
        Err(_) => Ok(default),
    }
}

/// The store presented as a remote API. Every call resolves after its
/// configured delay; calls are independent and unordered relative to each
/// other.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    repo: Arc<dyn Repository>,
    latency: Latency,
    replies: ReplyRules,
    /// Every appended message is announced here
    events_tx: broadcast::Sender<WorkspaceEvent>,
}

impl MockTransport {
    pub fn new(repo: Arc<dyn Repository>, latency: Latency, replies: ReplyRules) -> Self {
        let (events_tx, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(TransportInner {
                repo,
                latency,
                replies,
                events_tx,
            }),
        }
    }

    pub fn current_user_id(&self) -> &str {
        self.inner.repo.current_user_id()
    }

    /// Subscribe to message events, including scripted replies.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkspaceEvent> {
        self.inner.events_tx.subscribe()
    }

    pub async fn users(&self) -> Vec<User> {
        sleep(self.inner.latency.read).await;
        self.inner.repo.users()
    }

    pub async fn channels(&self) -> Vec<Channel> {
        sleep(self.inner.latency.read).await;
        self.inner.repo.channels()
    }

    /// All messages in the channel, in store order. Unknown channels are
    /// simply empty.
    pub async fn fetch_messages(&self, channel_id: &str) -> Vec<Message> {
        sleep(self.inner.latency.read).await;
        let messages = self.inner.repo.fetch_messages(channel_id);
        debug!("Fetched {} messages for {}", messages.len(), channel_id);
        messages
    }

    pub async fn fetch_summary(&self, channel_id: &str) -> Option<AiSummary> {
        sleep(self.inner.latency.summary).await;
        self.inner.repo.fetch_summary(channel_id)
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> Vec<Message> {
        sleep(self.inner.latency.search).await;
        let results = self.inner.repo.search(criteria);
        debug!("Search {:?} returned {} messages", criteria.query, results.len());
        results
    }

    pub async fn suggest(&self, query: &str) -> Suggestions {
        sleep(self.inner.latency.search).await;
        self.inner.repo.suggest(query)
    }

    /// Append a message, announce it, then schedule any scripted reply.
    pub async fn post_message(&self, draft: MessageDraft) -> Result<Message, StoreError> {
        sleep(self.inner.latency.read).await;

        let message = self.inner.repo.post_message(draft)?;
        self.publish(&message);

        if let Some(reply) = self.inner.replies.reply_to(&message) {
            self.spawn_reply(reply);
        }

        Ok(message)
    }

    fn spawn_reply(&self, reply: MessageDraft) {
        let transport = self.clone();
        tokio::spawn(async move {
            sleep(transport.inner.latency.reply).await;
            // Replies go straight to the store so they never trigger rules themselves
            match transport.inner.repo.post_message(reply) {
                Ok(message) => transport.publish(&message),
                Err(e) => warn!("Scripted reply dropped: {}", e),
            }
        });
    }

    fn publish(&self, message: &Message) {
        // No subscribers is fine
        let _ = self.inner.events_tx.send(WorkspaceEvent::MessageCreate {
            message: message.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stack_store::MemoryStore;
    use tokio::time::Instant;

    fn transport(latency: Latency) -> MockTransport {
        let store = Arc::new(MemoryStore::seeded());
        let replies = ReplyRules::demo(store.as_ref());
        MockTransport::new(store, latency, replies)
    }

    fn draft(channel_id: &str, content: &str) -> MessageDraft {
        MessageDraft {
            user_id: "u01".into(),
            channel_id: channel_id.into(),
            content: content.into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn reads_resolve_after_their_delay() {
        let transport = transport(Latency::default());

        let start = Instant::now();
        let messages = transport.fetch_messages("c01").await;
        assert_eq!(messages.len(), 15);
        assert!(start.elapsed() >= Duration::from_millis(500));

        let start = Instant::now();
        let summary = transport.fetch_summary("c01").await;
        assert!(summary.is_some());
        assert!(start.elapsed() >= Duration::from_millis(1500));

        assert_eq!(transport.fetch_summary("unknown").await, None);
        assert!(transport.fetch_messages("unknown").await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_calls_are_independent() {
        let transport = transport(Latency::default());

        let start = Instant::now();
        let (summary, messages) = tokio::join!(
            transport.fetch_summary("c02"),
            transport.fetch_messages("c02"),
        );
        assert!(summary.is_some());
        assert_eq!(messages.len(), 2);
        // Both overlap; the slower call bounds the total
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1500));
        assert!(elapsed < Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn search_through_transport() {
        let transport = transport(Latency::default());
        let results = transport.search(&SearchCriteria::new("password")).await;
        let ids: Vec<&str> = results.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m08", "m02"]);

        assert!(transport.search(&SearchCriteria::new("  ")).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn post_publishes_and_persists() {
        let transport = transport(Latency::default());
        let mut events = transport.subscribe();

        let posted = transport.post_message(draft("c01", "hi")).await.unwrap();
        assert_eq!(posted.content, "hi");

        let event = events.recv().await.unwrap();
        assert_eq!(event, WorkspaceEvent::MessageCreate { message: posted.clone() });

        let thread = transport.fetch_messages("c01").await;
        assert_eq!(thread.last(), Some(&posted));
    }

    #[tokio::test(start_paused = true)]
    async fn post_to_unknown_channel_fails() {
        let transport = transport(Latency::none());
        let err = transport.post_message(draft("c99", "hi")).await.unwrap_err();
        assert_eq!(err, StoreError::ChannelNotFound("c99".into()));
    }

    #[tokio::test(start_paused = true)]
    async fn direct_message_gets_scripted_reply() {
        let transport = transport(Latency::default());
        let mut events = transport.subscribe();

        let posted = transport.post_message(draft("dm_u02", "are you around?")).await.unwrap();
        let event = events.recv().await.unwrap();
        assert_eq!(event, WorkspaceEvent::MessageCreate { message: posted });

        // The reply arrives after the reply delay
        let Ok(WorkspaceEvent::MessageCreate { message: reply }) = events.recv().await else {
            panic!("expected the scripted reply");
        };
        assert_eq!(reply.user_id, "u02");
        assert_eq!(reply.channel_id, "dm_u02");

        let thread = transport.fetch_messages("dm_u02").await;
        assert_eq!(thread.len(), 2);
    }
}
