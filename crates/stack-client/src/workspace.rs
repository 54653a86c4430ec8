//! Session state shared by the views, plus guards that drop responses
//! belonging to a selection or query the user has already moved past.

use tracing::debug;

use stack_types::models::{Channel, Message};

/// At most one search surface is open at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchOverlay {
    #[default]
    Closed,
    /// Quick-search dropdown with its own draft query
    Dropdown { draft: String },
    /// Full-page search
    Modal { query: String },
}

/// Identifies the channel selection a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionToken(u64);

/// Identifies the modal query a search was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchToken(u64);

#[derive(Debug, Clone)]
pub struct WorkspaceState {
    current_user_id: String,
    selected_channel_id: String,
    sidebar_open: bool,
    overlay: SearchOverlay,
    selection_generation: u64,
    search_generation: u64,
}

impl WorkspaceState {
    pub fn new(current_user_id: impl Into<String>, initial_channel_id: impl Into<String>) -> Self {
        Self {
            current_user_id: current_user_id.into(),
            selected_channel_id: initial_channel_id.into(),
            sidebar_open: false,
            overlay: SearchOverlay::Closed,
            selection_generation: 0,
            search_generation: 0,
        }
    }

    /// Starts on the first channel of the list; `None` if there are none.
    pub fn from_channels(current_user_id: impl Into<String>, channels: &[Channel]) -> Option<Self> {
        channels
            .first()
            .map(|first| Self::new(current_user_id, first.id.clone()))
    }

    pub fn current_user_id(&self) -> &str {
        &self.current_user_id
    }

    pub fn selected_channel_id(&self) -> &str {
        &self.selected_channel_id
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn overlay(&self) -> &SearchOverlay {
        &self.overlay
    }

    pub fn is_search_dropdown_open(&self) -> bool {
        matches!(self.overlay, SearchOverlay::Dropdown { .. })
    }

    pub fn is_search_modal_open(&self) -> bool {
        matches!(self.overlay, SearchOverlay::Modal { .. })
    }

    /// Query of the open overlay, empty when none is open.
    pub fn search_query(&self) -> &str {
        match &self.overlay {
            SearchOverlay::Closed => "",
            SearchOverlay::Dropdown { draft } => draft,
            SearchOverlay::Modal { query } => query,
        }
    }

    /// Switch channels. Closes the sidebar and any search overlay, and
    /// invalidates every token issued for the previous selection.
    pub fn select_channel(&mut self, channel_id: impl Into<String>) -> SelectionToken {
        self.selected_channel_id = channel_id.into();
        self.sidebar_open = false;
        self.set_overlay(SearchOverlay::Closed);
        self.selection_generation += 1;
        debug!("Selected {}", self.selected_channel_id);
        self.selection_token()
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }

    pub fn open_search_dropdown(&mut self) {
        if !self.is_search_dropdown_open() {
            self.set_overlay(SearchOverlay::Dropdown { draft: String::new() });
        }
    }

    pub fn close_search_dropdown(&mut self) {
        if self.is_search_dropdown_open() {
            self.set_overlay(SearchOverlay::Closed);
        }
    }

    /// Open the full-page search, pre-filled with `seed`.
    pub fn open_search_modal(&mut self, seed: impl Into<String>) -> SearchToken {
        self.set_overlay(SearchOverlay::Modal { query: seed.into() });
        self.search_token()
    }

    /// Carry the dropdown draft into the full-page search. Does nothing
    /// unless the dropdown is open with a non-blank draft.
    pub fn promote_dropdown(&mut self) -> Option<SearchToken> {
        match &self.overlay {
            SearchOverlay::Dropdown { draft } if !draft.trim().is_empty() => {
                let seed = draft.clone();
                Some(self.open_search_modal(seed))
            }
            _ => None,
        }
    }

    pub fn close_search_modal(&mut self) {
        if self.is_search_modal_open() {
            self.set_overlay(SearchOverlay::Closed);
        }
    }

    /// Edit the query of whichever overlay is open.
    pub fn set_search_query(&mut self, text: impl Into<String>) -> SearchToken {
        match &mut self.overlay {
            SearchOverlay::Closed => {}
            SearchOverlay::Dropdown { draft } => *draft = text.into(),
            SearchOverlay::Modal { query } => {
                *query = text.into();
                self.search_generation += 1;
            }
        }
        self.search_token()
    }

    pub fn selection_token(&self) -> SelectionToken {
        SelectionToken(self.selection_generation)
    }

    pub fn search_token(&self) -> SearchToken {
        SearchToken(self.search_generation)
    }

    pub fn is_current(&self, token: SelectionToken) -> bool {
        token.0 == self.selection_generation
    }

    pub fn is_current_search(&self, token: SearchToken) -> bool {
        self.is_search_modal_open() && token.0 == self.search_generation
    }

    fn set_overlay(&mut self, overlay: SearchOverlay) {
        if self.overlay != overlay {
            self.search_generation += 1;
        }
        self.overlay = overlay;
    }
}

/// The message thread on screen. Loads are tagged with the selection they
/// were issued for; a load that finishes after the user moved on is dropped.
#[derive(Debug, Default)]
pub struct ChannelFeed {
    pending: Option<(SelectionToken, String)>,
    channel_id: Option<String>,
    messages: Vec<Message>,
}

impl ChannelFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading `channel_id` for `token`. Clears the current thread.
    pub fn begin(&mut self, token: SelectionToken, channel_id: impl Into<String>) {
        self.pending = Some((token, channel_id.into()));
        self.channel_id = None;
        self.messages.clear();
    }

    /// Apply a finished load. Returns `false` and leaves the feed untouched
    /// when the load is not the most recent one begun.
    pub fn apply(&mut self, token: SelectionToken, messages: Vec<Message>) -> bool {
        match self.pending.take() {
            Some((pending, channel_id)) if pending == token => {
                self.channel_id = Some(channel_id);
                self.messages = messages;
                true
            }
            other => {
                debug!("Dropping stale load for {:?}", token);
                self.pending = other;
                false
            }
        }
    }

    /// Append a message sent from this session or announced by the gateway.
    /// Ignored when it belongs to another channel or is already shown.
    pub fn push(&mut self, message: Message) -> bool {
        if self.channel_id.as_deref() != Some(message.channel_id.as_str()) {
            return false;
        }
        if self.messages.iter().any(|m| m.id == message.id) {
            return false;
        }
        self.messages.push(message);
        true
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stack_store::{MemoryStore, Repository};

    use crate::replies::ReplyRules;
    use crate::transport::{Latency, MockTransport};

    fn state() -> WorkspaceState {
        let store = MemoryStore::seeded();
        WorkspaceState::from_channels(store.current_user_id(), &store.channels()).unwrap()
    }

    #[test]
    fn starts_on_first_channel() {
        let state = state();
        assert_eq!(state.selected_channel_id(), "c01");
        assert_eq!(state.current_user_id(), "u01");
        assert!(!state.is_sidebar_open());
        assert_eq!(state.overlay(), &SearchOverlay::Closed);

        assert!(WorkspaceState::from_channels("u01", &[]).is_none());
    }

    #[test]
    fn selecting_a_channel_closes_overlays() {
        let mut state = state();
        state.toggle_sidebar();
        state.open_search_modal("deploy");
        assert!(state.is_sidebar_open());

        state.select_channel("c03");
        assert_eq!(state.selected_channel_id(), "c03");
        assert!(!state.is_sidebar_open());
        assert!(!state.is_search_modal_open());
        assert_eq!(state.search_query(), "");
    }

    #[test]
    fn overlays_are_mutually_exclusive() {
        let mut state = state();

        state.open_search_dropdown();
        assert!(state.is_search_dropdown_open());

        state.open_search_modal("");
        assert!(state.is_search_modal_open());
        assert!(!state.is_search_dropdown_open());

        state.open_search_dropdown();
        assert!(state.is_search_dropdown_open());
        assert!(!state.is_search_modal_open());
    }

    #[test]
    fn dropdown_draft_carries_into_modal() {
        let mut state = state();
        state.open_search_dropdown();
        assert_eq!(state.promote_dropdown(), None);

        state.set_search_query("password");
        assert!(state.promote_dropdown().is_some());
        assert!(state.is_search_modal_open());
        assert_eq!(state.search_query(), "password");

        state.close_search_modal();
        assert_eq!(state.overlay(), &SearchOverlay::Closed);
        assert_eq!(state.search_query(), "");

        // Reopening the dropdown starts from a blank draft
        state.open_search_dropdown();
        assert_eq!(state.search_query(), "");
    }

    #[test]
    fn closing_the_wrong_overlay_is_a_no_op() {
        let mut state = state();
        state.open_search_modal("roles");
        state.close_search_dropdown();
        assert!(state.is_search_modal_open());
        assert_eq!(state.search_query(), "roles");
    }

    #[test]
    fn search_tokens_go_stale_when_query_changes() {
        let mut state = state();
        let first = state.open_search_modal("pass");
        assert!(state.is_current_search(first));

        let second = state.set_search_query("password");
        assert!(!state.is_current_search(first));
        assert!(state.is_current_search(second));

        state.close_search_modal();
        assert!(!state.is_current_search(second));
    }

    #[test]
    fn feed_drops_stale_loads() {
        let mut state = state();
        let mut feed = ChannelFeed::new();

        let first = state.selection_token();
        feed.begin(first, "c01");

        let second = state.select_channel("c02");
        feed.begin(second, "c02");
        assert!(!state.is_current(first));

        // The slow c01 load finishes after the switch
        assert!(!feed.apply(first, vec![]));
        assert!(feed.is_loading());

        let store = MemoryStore::seeded();
        assert!(feed.apply(second, store.fetch_messages("c02")));
        assert!(!feed.is_loading());
        assert_eq!(feed.channel_id(), Some("c02"));
        assert_eq!(feed.messages().len(), 2);
    }

    #[test]
    fn feed_push_filters_channel_and_duplicates() {
        let store = MemoryStore::seeded();
        let mut state = state();
        let mut feed = ChannelFeed::new();
        let token = state.select_channel("c03");
        feed.begin(token, "c03");
        feed.apply(token, store.fetch_messages("c03"));

        let other = store.fetch_messages("c02").remove(0);
        assert!(!feed.push(other));

        let existing = feed.messages()[0].clone();
        assert!(!feed.push(existing));
        assert_eq!(feed.messages().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_channels_mid_flight_keeps_the_newer_thread() {
        let store = Arc::new(MemoryStore::seeded());
        let transport = MockTransport::new(store, Latency::default(), ReplyRules::new());
        let mut state = state();
        let mut feed = ChannelFeed::new();

        let first = state.selection_token();
        feed.begin(first, "c01");
        let slow = tokio::spawn({
            let transport = transport.clone();
            async move { transport.fetch_messages("c01").await }
        });

        let second = state.select_channel("c04");
        feed.begin(second, "c04");
        let fresh = transport.fetch_messages("c04").await;
        assert!(feed.apply(second, fresh));

        let stale = slow.await.unwrap();
        assert!(!feed.apply(first, stale));
        assert_eq!(feed.channel_id(), Some("c04"));
        assert_eq!(feed.messages().len(), 1);
    }
}
