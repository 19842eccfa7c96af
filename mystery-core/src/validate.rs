//! Consistency checks for scenario documents.
//!
//! [`validate`] runs every check and returns all failures at once. Checks are
//! independent of each other, so a scenario with one defect reports exactly
//! that defect. Validation is pure: the same scenario always yields the same
//! result.

use crate::render::{PersonaPrompt, PromptRenderer};
use crate::scenario::{resolve_timeline, Persona, Scenario, TimeSpan, TimelineEntry};
use crate::slug::check_slug;
use crate::stress::StressLevel;
use crate::Placeholders;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use thiserror::Error;

/// Fewest suspects a case can have.
pub const MIN_PERSONAS: usize = 4;

/// Fewest critical clues a case can have.
pub const MIN_CRITICAL_CLUES: usize = 3;

/// Murderer facts shorter than this are too generic to count as leaked.
const MIN_LEAK_CHARS: usize = 24;

const TIME_OF_DEATH_WORDS: &[&str] =
    &["time of death", "estimated time", "todeszeit", "tatzeit"];

const DISCOVERY_WORDS: &[&str] = &[
    "find", "found", "discover", "body", "corpse", "entdeckt", "gefunden", "leiche",
];

const MOTIVE_WORDS: &[&str] = &[
    "argu", "quarrel", "conflict", "motive", "threat", "debt", "affair", "blackmail", "jealous",
    "resent", "fired", "terminat", "refus", "declin", "hate", "inherit", "rival", "accus",
    "streit", "motiv", "schulden", "affäre", "erpress", "konflikt",
];

const ALIBI_WORDS: &[&str] = &[
    "alibi", "you were at", "you were home", "at home", "you left", "you stayed", "witness",
    "camera can confirm", "zeugen", "warst zu hause", "du warst",
];

/// One failed consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("scenario has {found} personas, at least 4 are required")]
    TooFewPersonas { found: usize },

    #[error("murderer {slug:?} is not one of the personas")]
    UnknownMurderer { slug: String },

    #[error("invalid persona slug {slug:?}: {reason}")]
    InvalidSlug { slug: String, reason: String },

    #[error("scenario has {found} critical clues, at least 3 are required")]
    InsufficientClues { found: usize },

    #[error("timeline inconsistent: {reason}")]
    TimelineInconsistent { reason: String },

    #[error("persona {slug:?} has no {missing} in their private knowledge")]
    IncompletePersona { slug: String, missing: PersonaGap },

    #[error("{persona:?} repeats a secret of the murderer in what they know about {about:?}")]
    KnowledgeLeak { persona: String, about: String },

    #[error("the murderer is {expected:?}, but the murderer marker is carried by {marked:?}")]
    MurdererMarkerMismatch { expected: String, marked: Vec<String> },

    #[error("persona {slug:?} would be instructed with an empty {{{placeholder}}}")]
    MissingContent { slug: String, placeholder: String },
}

impl ValidationError {
    /// Stable name of the failed check.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::TooFewPersonas { .. } => "too_few_personas",
            ValidationError::UnknownMurderer { .. } => "unknown_murderer",
            ValidationError::InvalidSlug { .. } => "invalid_slug",
            ValidationError::InsufficientClues { .. } => "insufficient_clues",
            ValidationError::TimelineInconsistent { .. } => "timeline_inconsistent",
            ValidationError::IncompletePersona { .. } => "incomplete_persona",
            ValidationError::KnowledgeLeak { .. } => "knowledge_leak",
            ValidationError::MurdererMarkerMismatch { .. } => "murderer_marker_mismatch",
            ValidationError::MissingContent { .. } => "missing_content",
        }
    }
}

/// What an innocent persona is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaGap {
    Motive,
    Alibi,
    MotiveAndAlibi,
}

impl fmt::Display for PersonaGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PersonaGap::Motive => "motive or conflict",
            PersonaGap::Alibi => "alibi",
            PersonaGap::MotiveAndAlibi => "motive or conflict and no alibi",
        })
    }
}

/// Check a scenario for consistency.
pub fn validate(scenario: &Scenario) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if scenario.personas.len() < MIN_PERSONAS {
        errors.push(ValidationError::TooFewPersonas {
            found: scenario.personas.len(),
        });
    }

    let murderer = scenario.murderer();
    if murderer.is_none() {
        errors.push(ValidationError::UnknownMurderer {
            slug: scenario.solution.murderer.clone(),
        });
    }

    errors.extend(check_slugs(&scenario.personas));

    let clues = scenario
        .solution
        .critical_clues
        .iter()
        .filter(|clue| !clue.trim().is_empty())
        .count();
    if clues < MIN_CRITICAL_CLUES {
        errors.push(ValidationError::InsufficientClues { found: clues });
    }

    if let Some(reason) = check_timeline(&scenario.timeline) {
        errors.push(ValidationError::TimelineInconsistent { reason });
    }

    for persona in &scenario.personas {
        if scenario.is_murderer(&persona.slug) || persona.carries_murderer_marker() {
            continue;
        }
        if let Some(missing) = innocent_gap(persona) {
            errors.push(ValidationError::IncompletePersona {
                slug: persona.slug.clone(),
                missing,
            });
        }
    }

    if let Some(murderer) = murderer {
        errors.extend(check_leaks(scenario, murderer));

        let marked: Vec<String> = scenario
            .personas
            .iter()
            .filter(|p| p.carries_murderer_marker())
            .map(|p| p.slug.clone())
            .collect();
        if marked.len() != 1 || marked[0] != murderer.slug {
            errors.push(ValidationError::MurdererMarkerMismatch {
                expected: murderer.slug.clone(),
                marked,
            });
        }
    }

    errors.extend(check_content(scenario));

    for error in &errors {
        tracing::debug!(kind = error.kind(), %error, "Scenario check failed");
    }
    tracing::info!(
        scenario = %scenario.name,
        errors = errors.len(),
        "Scenario validated"
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_slugs(personas: &[Persona]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();

    for persona in personas {
        if let Err(problem) = check_slug(&persona.slug) {
            errors.push(ValidationError::InvalidSlug {
                slug: persona.slug.clone(),
                reason: problem.to_string(),
            });
        }
        if !seen.insert(persona.slug.as_str()) {
            duplicates.insert(persona.slug.as_str());
        }
    }

    errors.extend(duplicates.into_iter().map(|slug| ValidationError::InvalidSlug {
        slug: slug.to_string(),
        reason: "slug is used by more than one persona".to_string(),
    }));
    errors
}

/// The reason the timeline fails, if it does.
fn check_timeline(timeline: &[TimelineEntry]) -> Option<String> {
    let spans = match resolve_timeline(timeline) {
        Ok(spans) => spans,
        Err(e) => return Some(e.to_string()),
    };

    if let Some(i) = (1..spans.len()).find(|&i| spans[i].start < spans[i - 1].start) {
        return Some(format!(
            "{:?} is listed after {:?} but happens before it",
            timeline[i].time,
            timeline[i - 1].time
        ));
    }

    let Some(window) = timeline
        .iter()
        .zip(&spans)
        .position(|(entry, span)| span.is_range() && mentions(&entry.event, TIME_OF_DEATH_WORDS))
    else {
        return Some("no estimated time-of-death window".to_string());
    };
    let window_span = spans[window];

    let Some(last_before) = spans[..window].iter().map(|s: &TimeSpan| s.end).max() else {
        return Some("no event before the time-of-death window".to_string());
    };
    if last_before >= window_span.start {
        return Some(format!(
            "time-of-death window {:?} does not start after the preceding events",
            timeline[window].time
        ));
    }

    let discovery = (window + 1..timeline.len())
        .find(|&i| mentions(&timeline[i].event, DISCOVERY_WORDS))
        .or_else(|| (window + 1 < timeline.len()).then_some(window + 1));
    let Some(discovery) = discovery else {
        return Some("no discovery after the time-of-death window".to_string());
    };
    if window_span.end >= spans[discovery].start {
        return Some(format!(
            "time-of-death window {:?} does not end before the discovery at {:?}",
            timeline[window].time,
            timeline[discovery].time
        ));
    }

    None
}

/// Required instruction fields that would render empty.
///
/// Timeline gaps are left to [`check_timeline`].
fn check_content(scenario: &Scenario) -> Vec<ValidationError> {
    let Ok(renderer) = PromptRenderer::standard() else {
        return Vec::new();
    };

    let mut errors = Vec::new();
    for persona in &scenario.personas {
        let Ok(prompt) = renderer.prompt_for(scenario, &persona.slug, StressLevel::calm()) else {
            continue;
        };
        for name in PersonaPrompt::PLACEHOLDERS {
            if *name == "timeline" || PersonaPrompt::is_optional(name) {
                continue;
            }
            if prompt.placeholder(name).map_or(true, |value| value.trim().is_empty()) {
                errors.push(ValidationError::MissingContent {
                    slug: persona.slug.clone(),
                    placeholder: name.to_string(),
                });
            }
        }
    }
    errors
}

fn innocent_gap(persona: &Persona) -> Option<PersonaGap> {
    let has = |words: &[&str]| persona.private_knowledge.iter().any(|fact| mentions(fact, words));
    match (has(MOTIVE_WORDS), has(ALIBI_WORDS)) {
        (true, true) => None,
        (false, true) => Some(PersonaGap::Motive),
        (true, false) => Some(PersonaGap::Alibi),
        (false, false) => Some(PersonaGap::MotiveAndAlibi),
    }
}

fn check_leaks(scenario: &Scenario, murderer: &Persona) -> Vec<ValidationError> {
    let secrets: Vec<String> = murderer
        .private_knowledge
        .iter()
        .map(|fact| normalize(fact))
        .filter(|fact| fact.chars().count() >= MIN_LEAK_CHARS)
        .collect();

    let mut errors = Vec::new();
    for persona in scenario.personas.iter().filter(|p| p.slug != murderer.slug) {
        for (key, fragment) in persona.knows_about_others.iter() {
            let fragment = normalize(fragment);
            if secrets.iter().any(|secret| fragment.contains(secret.as_str())) {
                let about = scenario
                    .resolve_persona(key)
                    .map(|p| p.slug.clone())
                    .unwrap_or_else(|| key.to_string());
                errors.push(ValidationError::KnowledgeLeak {
                    persona: persona.slug.clone(),
                    about,
                });
            }
        }
    }
    errors
}

fn mentions(text: &str, words: &[&str]) -> bool {
    let text = text.to_lowercase();
    words.iter().any(|word| text.contains(word))
}

/// Lowercase with whitespace runs collapsed.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(items: &[(&str, &str)]) -> Vec<TimelineEntry> {
        items.iter().map(|(t, e)| TimelineEntry::new(*t, *e)).collect()
    }

    #[test]
    fn test_timeline_accepts_bracketed_window() {
        let timeline = entries(&[
            ("Friday 7:00 PM", "Dinner"),
            ("Friday 9:30 PM - 11:00 PM", "Estimated time of death"),
            ("Saturday 8:30 AM", "The gardener finds the body"),
        ]);
        assert_eq!(check_timeline(&timeline), None);
    }

    #[test]
    fn test_timeline_out_of_order() {
        let timeline = entries(&[("20:00", "dinner"), ("19:00", "discovery")]);
        let reason = check_timeline(&timeline).unwrap();
        assert!(reason.contains("before"), "{reason}");
    }

    #[test]
    fn test_timeline_missing_window() {
        let timeline = entries(&[("19:00", "dinner"), ("23:00", "body found")]);
        assert!(check_timeline(&timeline).unwrap().contains("window"));
    }

    #[test]
    fn test_timeline_window_overlaps_discovery() {
        let timeline = entries(&[
            ("19:00", "Dinner"),
            ("21:00 - 23:00", "Estimated time of death"),
            ("22:30", "Butler finds the body"),
        ]);
        assert!(check_timeline(&timeline).is_some());
    }

    #[test]
    fn test_timeline_window_needs_preceding_event() {
        let timeline = entries(&[
            ("21:00 - 23:00", "Estimated time of death"),
            ("23:30", "Body found"),
        ]);
        assert!(check_timeline(&timeline).unwrap().contains("before"));
    }

    #[test]
    fn test_timeline_unparseable() {
        let timeline = entries(&[("sometime", "Dinner")]);
        assert!(check_timeline(&timeline).unwrap().contains("sometime"));
    }

    #[test]
    fn test_estimate_alone_is_not_a_death_window() {
        let timeline = entries(&[
            ("Friday 6:00 PM", "Staff prepare the hall"),
            ("Friday 7:00 PM - 7:30 PM", "Estimated arrival of the guests"),
            ("Saturday 8:30 AM", "The gardener finds the body"),
        ]);
        assert_eq!(
            check_timeline(&timeline),
            Some("no estimated time-of-death window".to_string())
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  You  SOLD\tthe originals "), "you sold the originals");
    }

    #[test]
    fn test_gap_display() {
        let error = ValidationError::IncompletePersona {
            slug: "klaus".into(),
            missing: PersonaGap::Alibi,
        };
        assert_eq!(error.kind(), "incomplete_persona");
        assert!(error.to_string().contains("alibi"));
    }
}
