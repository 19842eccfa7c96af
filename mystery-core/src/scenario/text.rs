//! Free-text scenario bodies.
//!
//! Older scenarios keep lists, the timeline and `knows_about_others` as
//! bullet-point prose. These helpers read either shape; serialization
//! always writes the structured one.

use super::timeline::TimelineEntry;
use serde::{Deserialize, Deserializer};

const BULLETS: [&str; 3] = ["- ", "* ", "• "];

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Items(Vec<String>),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Entry(TimelineEntry),
    Line(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimelineBody {
    Entries(Vec<RawEntry>),
    Text(String),
}

/// `deserialize_with` for string lists.
pub(crate) fn list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ListBody::deserialize(deserializer)? {
        ListBody::Items(items) => items,
        ListBody::Text(text) => list_items(&text),
    })
}

/// `deserialize_with` for the timeline.
pub(crate) fn timeline<'de, D>(deserializer: D) -> Result<Vec<TimelineEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match TimelineBody::deserialize(deserializer)? {
        TimelineBody::Entries(entries) => entries
            .into_iter()
            .map(|entry| match entry {
                RawEntry::Entry(entry) => entry,
                RawEntry::Line(line) => timeline_line(strip_bullet(line.trim()).unwrap_or(line.trim())),
            })
            .collect(),
        TimelineBody::Text(text) => timeline_entries(&text),
    })
}

/// Split prose into items, one per non-empty line, bullets removed.
pub fn list_items(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| strip_bullet(line).unwrap_or(line).trim().to_string())
        .collect()
}

/// Read a bulleted timeline. Lines without a bullet are headers and skipped.
pub fn timeline_entries(text: &str) -> Vec<TimelineEntry> {
    text.lines()
        .filter_map(|line| strip_bullet(line.trim()))
        .map(timeline_line)
        .collect()
}

/// Split `TIME: EVENT`, or `TIME EVENT` when there is no `": "`.
pub fn timeline_line(line: &str) -> TimelineEntry {
    let line = line.trim();
    if let Some((time, event)) = line.split_once(": ") {
        return TimelineEntry::new(time.trim(), event.trim());
    }
    match line.split_once(char::is_whitespace) {
        Some((time, event)) => TimelineEntry::new(time, event.trim()),
        None => TimelineEntry::new(line, ""),
    }
}

/// Read `- Name: "text"` lines. Everything else is returned as loose lines.
pub fn named_fragments(text: &str) -> (Vec<(String, String)>, Vec<String>) {
    let mut named = Vec::new();
    let mut loose = Vec::new();

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let split = strip_bullet(line).and_then(|item| item.split_once(": "));
        match split {
            Some((name, fragment)) if !name.trim().is_empty() => {
                named.push((name.trim().to_string(), unquote(fragment.trim()).to_string()));
            }
            _ => loose.push(strip_bullet(line).unwrap_or(line).to_string()),
        }
    }

    (named, loose)
}

fn strip_bullet(line: &str) -> Option<&str> {
    BULLETS.iter().find_map(|bullet| line.strip_prefix(bullet))
}

fn unquote(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, '"' | '„' | '“' | '”'))
}
