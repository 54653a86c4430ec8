//! Pure filter/sort functions over message, channel and user collections.

use std::cmp::Ordering;
use std::collections::HashMap;

use stack_types::api::{SearchCriteria, SortBy, Suggestions};
use stack_types::models::{Channel, Message, User};

/// Maximum entries per section of the quick-search dropdown.
pub const SUGGESTION_LIMIT: usize = 3;

/// Messages in `channel_id`, in store order.
pub fn channel_messages(messages: &[Message], channel_id: &str) -> Vec<Message> {
    messages
        .iter()
        .filter(|m| m.channel_id == channel_id)
        .cloned()
        .collect()
}

/// One synthetic DM channel per user other than the current one.
pub fn direct_message_channels(users: &[User], current_user_id: &str) -> Vec<Channel> {
    users
        .iter()
        .filter(|u| u.id != current_user_id)
        .map(Channel::direct_message)
        .collect()
}

/// Workspace search.
///
/// A message matches when its content or its author's display name contains
/// the query, ignoring case. The optional author and channel filters then
/// narrow the candidates; an empty filter string counts as absent.
/// A blank query matches nothing.
pub fn search(messages: &[Message], users: &[User], criteria: &SearchCriteria) -> Vec<Message> {
    if criteria.query.trim().is_empty() {
        return Vec::new();
    }

    let needle = criteria.query.to_lowercase();
    let from_user = supplied(&criteria.from_user_id);
    let in_channel = supplied(&criteria.in_channel_id);

    let author_names: HashMap<&str, String> = users
        .iter()
        .map(|u| (u.id.as_str(), u.name.to_lowercase()))
        .collect();

    // (exact full-content match, message)
    let mut hits: Vec<(bool, &Message)> = messages
        .iter()
        .filter(|m| from_user.is_none_or(|id| m.user_id == id))
        .filter(|m| in_channel.is_none_or(|id| m.channel_id == id))
        .filter_map(|m| {
            let content = m.content.to_lowercase();
            let author_matches = author_names
                .get(m.user_id.as_str())
                .is_some_and(|name| name.contains(&needle));

            (content.contains(&needle) || author_matches).then(|| (content == needle, m))
        })
        .collect();

    match criteria.sort_by {
        SortBy::Newest => hits.sort_by(|(_, a), (_, b)| b.timestamp.cmp(&a.timestamp)),
        SortBy::Oldest => hits.sort_by(|(_, a), (_, b)| a.timestamp.cmp(&b.timestamp)),
        SortBy::Relevant => hits.sort_by(relevance),
    }

    hits.into_iter().map(|(_, m)| m.clone()).collect()
}

/// Exact matches first and otherwise left in place; everything else newest
/// first. `sort_by` is stable, so equal exact matches keep store order.
fn relevance((a_exact, a): &(bool, &Message), (b_exact, b): &(bool, &Message)) -> Ordering {
    match (a_exact, b_exact) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => b.timestamp.cmp(&a.timestamp),
    }
}

/// Quick-search preview: channels whose name or description contains the
/// query, and messages whose content does. Store order, capped per section.
pub fn suggest(channels: &[Channel], messages: &[Message], query: &str) -> Suggestions {
    if query.trim().is_empty() {
        return Suggestions::default();
    }

    let needle = query.to_lowercase();

    let channels = channels
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
        })
        .take(SUGGESTION_LIMIT)
        .cloned()
        .collect();

    let messages = messages
        .iter()
        .filter(|m| m.content.to_lowercase().contains(&needle))
        .take(SUGGESTION_LIMIT)
        .cloned()
        .collect();

    Suggestions { channels, messages }
}

fn supplied(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().filter(|id| !id.is_empty())
}
