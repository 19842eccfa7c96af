//! Timeline entries and their time labels.
//!
//! Labels are the loose strings scenario authors write: `20:00`, `7:00 PM`,
//! `Friday 9:30 PM - 11:00 PM`, `Sunday 8:00 PM-11:00 PM`, `Samstag 18 Uhr`.
//! [`resolve_timeline`] turns a whole sequence of labels into comparable
//! [`TimeSpan`]s:
//!
//! - a leading weekday (English or German) is optional;
//! - a weekday earlier in the week than the previous one rolls over into the
//!   following week, an entry without a weekday stays on the previous day;
//! - a range whose end is earlier than its start crosses midnight.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One `{time, event}` line of the case timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub time: String,
    pub event: String,
}

impl TimelineEntry {
    pub fn new(time: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            event: event.into(),
        }
    }
}

/// A label that could not be read as a time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot read time {label:?}: {reason}")]
pub struct TimeParseError {
    pub label: String,
    pub reason: String,
}

impl TimeParseError {
    fn new(label: &str, reason: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

/// A point on the case clock: days since the first dated entry, then time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Moment {
    pub day: u32,
    pub time: NaiveTime,
}

/// The resolved extent of one timeline entry. Point events have `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: Moment,
    pub end: Moment,
}

impl TimeSpan {
    pub fn is_range(&self) -> bool {
        self.start != self.end
    }
}

/// A label read on its own, before day resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLabel {
    pub weekday: Option<Weekday>,
    pub start: NaiveTime,
    pub end: Option<NaiveTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy)]
struct RawClock {
    hour: u32,
    minute: u32,
    meridiem: Option<Meridiem>,
}

impl RawClock {
    fn to_time(self, inherited: Option<Meridiem>) -> Option<NaiveTime> {
        let meridiem = match (self.meridiem, inherited) {
            (Some(own), _) => Some(own),
            (None, Some(shared)) if (1..=12).contains(&self.hour) => Some(shared),
            _ => None,
        };
        let hour = match meridiem {
            None => self.hour,
            Some(_) if self.hour == 0 || self.hour > 12 => return None,
            Some(Meridiem::Am) => self.hour % 12,
            Some(Meridiem::Pm) => self.hour % 12 + 12,
        };
        NaiveTime::from_hms_opt(hour, self.minute, 0)
    }
}

/// Read a single label such as `Friday 9:30 PM - 11:00 PM`.
pub fn parse_time_label(label: &str) -> Result<TimeLabel, TimeParseError> {
    let text = label.trim();
    if text.is_empty() {
        return Err(TimeParseError::new(label, "empty"));
    }

    let (weekday, rest) = split_weekday(text);
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(TimeParseError::new(label, "no clock time"));
    }

    let normalized = rest
        .replace('–', "-")
        .replace('—', "-")
        .replace(" to ", "-")
        .replace(" bis ", "-");

    match normalized.split_once('-') {
        Some((first, second)) => {
            let first = parse_clock(first).ok_or_else(|| TimeParseError::new(label, "bad range start"))?;
            let second = parse_clock(second).ok_or_else(|| TimeParseError::new(label, "bad range end"))?;
            let start = first
                .to_time(second.meridiem)
                .ok_or_else(|| TimeParseError::new(label, "range start out of bounds"))?;
            let end = second
                .to_time(None)
                .ok_or_else(|| TimeParseError::new(label, "range end out of bounds"))?;
            Ok(TimeLabel {
                weekday,
                start,
                end: Some(end),
            })
        }
        None => {
            let clock = parse_clock(&normalized).ok_or_else(|| TimeParseError::new(label, "unrecognized clock time"))?;
            let start = clock
                .to_time(None)
                .ok_or_else(|| TimeParseError::new(label, "clock time out of bounds"))?;
            Ok(TimeLabel {
                weekday,
                start,
                end: None,
            })
        }
    }
}

fn split_weekday(text: &str) -> (Option<Weekday>, &str) {
    let (first, rest) = match text.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest),
        None => (text, ""),
    };
    match weekday_from_word(first.trim_end_matches(',')) {
        Some(day) => (Some(day), rest),
        None => (None, text),
    }
}

fn weekday_from_word(word: &str) -> Option<Weekday> {
    let day = match word.to_lowercase().as_str() {
        "monday" | "mon" | "montag" => Weekday::Mon,
        "tuesday" | "tue" | "tues" | "dienstag" => Weekday::Tue,
        "wednesday" | "wed" | "mittwoch" => Weekday::Wed,
        "thursday" | "thu" | "thurs" | "donnerstag" => Weekday::Thu,
        "friday" | "fri" | "freitag" => Weekday::Fri,
        "saturday" | "sat" | "samstag" | "sonnabend" => Weekday::Sat,
        "sunday" | "sun" | "sonntag" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn parse_clock(text: &str) -> Option<RawClock> {
    let mut text = text.trim().to_lowercase();

    if let Some(stripped) = text.strip_suffix("uhr") {
        text = stripped.trim_end().to_string();
    }

    let mut meridiem = None;
    for (suffix, value) in [
        ("a.m.", Meridiem::Am),
        ("p.m.", Meridiem::Pm),
        ("am", Meridiem::Am),
        ("pm", Meridiem::Pm),
    ] {
        if let Some(stripped) = text.strip_suffix(suffix) {
            meridiem = Some(value);
            text = stripped.trim_end().to_string();
            break;
        }
    }

    let (hour, minute) = match text.split_once(|c: char| c == ':' || c == '.') {
        Some((h, m)) if m.len() == 2 => (h, m),
        Some(_) => return None,
        None => (text.as_str(), "00"),
    };
    if hour.is_empty() || hour.len() > 2 || !hour.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !minute.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }

    Some(RawClock {
        hour,
        minute,
        meridiem,
    })
}

/// Resolve every entry of a timeline onto one clock.
///
/// Fails on the first label that cannot be read.
pub fn resolve_timeline(entries: &[TimelineEntry]) -> Result<Vec<TimeSpan>, TimeParseError> {
    let mut spans = Vec::with_capacity(entries.len());
    let mut day = 0u32;
    let mut last_weekday: Option<Weekday> = None;

    for entry in entries {
        let label = parse_time_label(&entry.time)?;

        if let Some(weekday) = label.weekday {
            if let Some(previous) = last_weekday {
                let from = previous.num_days_from_monday();
                let to = weekday.num_days_from_monday();
                day += (to + 7 - from) % 7;
            }
            last_weekday = Some(weekday);
        }

        let start = Moment {
            day,
            time: label.start,
        };
        let end = match label.end {
            Some(end) if end < label.start => Moment { day: day + 1, time: end },
            Some(end) => Moment { day, time: end },
            None => start,
        };
        spans.push(TimeSpan { start, end });
    }

    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_twenty_four_hour_clock() {
        let label = parse_time_label("20:00").unwrap();
        assert_eq!(label.weekday, None);
        assert_eq!(label.start, hm(20, 0));
        assert_eq!(label.end, None);
        assert_eq!(parse_time_label("18.30 Uhr").unwrap().start, hm(18, 30));
        assert_eq!(parse_time_label("Samstag 18 Uhr").unwrap().start, hm(18, 0));
    }

    #[test]
    fn test_twelve_hour_clock() {
        assert_eq!(parse_time_label("7:00 PM").unwrap().start, hm(19, 0));
        assert_eq!(parse_time_label("12:15 am").unwrap().start, hm(0, 15));
        assert_eq!(parse_time_label("12 PM").unwrap().start, hm(12, 0));
        assert!(parse_time_label("13:00 PM").is_err());
    }

    #[test]
    fn test_weekday_and_range() {
        let label = parse_time_label("Friday 9:30 PM - 11:00 PM").unwrap();
        assert_eq!(label.weekday, Some(Weekday::Fri));
        assert_eq!(label.start, hm(21, 30));
        assert_eq!(label.end, Some(hm(23, 0)));

        let compact = parse_time_label("Sunday 8:00 PM-11:00 PM").unwrap();
        assert_eq!(compact.start, hm(20, 0));

        let inherited = parse_time_label("9:30-11 PM").unwrap();
        assert_eq!(inherited.start, hm(21, 30));
    }

    #[test]
    fn test_unreadable_labels() {
        assert!(parse_time_label("").is_err());
        assert!(parse_time_label("Friday").is_err());
        assert!(parse_time_label("Sunday evening").is_err());
        assert!(parse_time_label("25:00").is_err());
        assert!(parse_time_label("7:5").is_err());
    }

    #[test]
    fn test_resolution_rolls_weekdays_forward() {
        let entries = vec![
            TimelineEntry::new("Saturday 6:00 PM", "a"),
            TimelineEntry::new("Sunday 7:00 PM", "b"),
            TimelineEntry::new("9:00 PM", "c"),
            TimelineEntry::new("Monday 7:30 AM", "d"),
        ];
        let spans = resolve_timeline(&entries).unwrap();
        assert_eq!(spans[0].start.day, 0);
        assert_eq!(spans[1].start.day, 1);
        assert_eq!(spans[2].start.day, 1);
        assert_eq!(spans[3].start.day, 2);
        assert!(spans.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn test_range_crossing_midnight() {
        let spans = resolve_timeline(&[TimelineEntry::new("Friday 11:00 PM - 1:00 AM", "x")]).unwrap();
        assert!(spans[0].is_range());
        assert_eq!(spans[0].end.day, 1);
        assert!(spans[0].end > spans[0].start);
    }
}
