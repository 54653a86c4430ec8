//! Turning stored text into display segments.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::{Regex, RegexBuilder};

use stack_types::models::Channel;

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("mention pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSegment<'a> {
    Text(&'a str),
    /// `@name`, including the `@`
    Mention(&'a str),
}

/// Split message content into plain text and `@name` mentions. Always
/// returns at least one segment.
pub fn parse_mentions(content: &str) -> Vec<ContentSegment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in MENTION.find_iter(content) {
        if m.start() > last {
            segments.push(ContentSegment::Text(&content[last..m.start()]));
        }
        segments.push(ContentSegment::Mention(m.as_str()));
        last = m.end();
    }

    if last < content.len() || segments.is_empty() {
        segments.push(ContentSegment::Text(&content[last..]));
    }

    segments
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSegment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// Split `text` around case-insensitive occurrences of `query`, taken
/// literally. A blank query yields the whole text unmatched.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<HighlightSegment<'a>> {
    let unmatched = |text| HighlightSegment { text, matched: false };

    if query.trim().is_empty() {
        return vec![unmatched(text)];
    }

    let Ok(pattern) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return vec![unmatched(text)];
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in pattern.find_iter(text) {
        if m.start() > last {
            segments.push(unmatched(&text[last..m.start()]));
        }
        segments.push(HighlightSegment {
            text: m.as_str(),
            matched: true,
        });
        last = m.end();
    }
    if last < text.len() || segments.is_empty() {
        segments.push(unmatched(&text[last..]));
    }

    segments
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span<'a> {
    Plain(&'a str),
    Bold(&'a str),
}

/// One line of a channel summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryBlock<'a> {
    Heading { level: u8, text: &'a str },
    Bullet(Vec<Span<'a>>),
    Paragraph(Vec<Span<'a>>),
    Blank,
}

/// Parse the summary Markdown subset line by line.
pub fn summary_blocks(content: &str) -> Vec<SummaryBlock<'_>> {
    content
        .lines()
        .map(|line| {
            if let Some(text) = line.strip_prefix("# ") {
                SummaryBlock::Heading { level: 1, text }
            } else if let Some(text) = line.strip_prefix("## ") {
                SummaryBlock::Heading { level: 2, text }
            } else if let Some(text) = line.strip_prefix("### ") {
                SummaryBlock::Heading { level: 3, text }
            } else if let Some(item) = line.strip_prefix("- ") {
                SummaryBlock::Bullet(spans(item))
            } else if line.trim().is_empty() {
                SummaryBlock::Blank
            } else {
                SummaryBlock::Paragraph(spans(line))
            }
        })
        .collect()
}

/// `**` toggles bold; an unclosed marker leaves the tail bold.
fn spans(line: &str) -> Vec<Span<'_>> {
    line.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| if i % 2 == 1 { Span::Bold(part) } else { Span::Plain(part) })
        .collect()
}

/// Human-readable message time relative to `now`, shown in `now`'s zone:
/// "10:15 AM" earlier today, "Yesterday at 3:30 PM", "Monday 9:00 AM"
/// within the week, otherwise "Oct 27, 10:15 AM".
pub fn format_timestamp<Tz>(timestamp: DateTime<Utc>, now: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let age = now.with_timezone(&Utc) - timestamp;
    let hours = age.num_minutes() as f64 / 60.0;
    let days = hours / 24.0;
    let local = timestamp.with_timezone(&now.timezone());

    if hours < 24.0 && local.date_naive() == now.date_naive() {
        local.format("%-I:%M %p").to_string()
    } else if (1.0..2.0).contains(&days) {
        format!("Yesterday at {}", local.format("%-I:%M %p"))
    } else if days < 7.0 {
        local.format("%A %-I:%M %p").to_string()
    } else {
        local.format("%b %-d, %-I:%M %p").to_string()
    }
}

/// `# name` for named channels, the partner's name for direct messages.
pub fn channel_label(channel: &Channel) -> String {
    if channel.is_direct_message() {
        channel.name.clone()
    } else {
        format!("# {}", channel.name)
    }
}
