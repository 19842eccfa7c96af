//! The scenario document.
//!
//! A scenario is one complete case: setting, victim, solution, timeline and
//! the suspects with their partitioned knowledge. It is authored once,
//! validated with [`crate::validate`] and then treated as immutable. Any
//! edit is a new scenario.
//!
//! The JSON encoding uses exactly the field names below. Older documents
//! that keep lists as bullet prose are accepted too (see [`text`]).

pub mod persona;
pub mod text;
pub mod timeline;

pub use persona::{KnowsAboutOthers, Persona, MURDERER_MARKERS, OTHERS_KEY};
pub use timeline::{parse_time_label, resolve_timeline, TimeParseError, TimeSpan, TimelineEntry};

use serde::{Deserialize, Serialize};

/// A complete murder case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub setting: String,
    pub victim: Victim,
    pub solution: Solution,
    /// Facts every persona knows.
    #[serde(deserialize_with = "text::list")]
    pub shared_knowledge: Vec<String>,
    #[serde(deserialize_with = "text::timeline")]
    pub timeline: Vec<TimelineEntry>,
    pub personas: Vec<Persona>,
    /// Opening message shown to the player.
    pub intro_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victim {
    pub name: String,
    pub role: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Slug of the guilty persona.
    pub murderer: String,
    pub motive: String,
    pub weapon: String,
    /// Evidence that proves the case, in order of discovery.
    #[serde(deserialize_with = "text::list")]
    pub critical_clues: Vec<String>,
}

impl Scenario {
    /// Parse a scenario from its JSON encoding.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Pretty-printed JSON in the structured form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Look up a persona by slug.
    pub fn persona(&self, slug: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.slug == slug)
    }

    /// The persona named as murderer by the solution, if it exists.
    pub fn murderer(&self) -> Option<&Persona> {
        self.persona(&self.solution.murderer)
    }

    pub fn is_murderer(&self, slug: &str) -> bool {
        self.solution.murderer == slug
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.personas.iter().map(|p| p.slug.as_str())
    }

    /// Find the persona a `knows_about_others` key refers to.
    pub fn resolve_persona(&self, key: &str) -> Option<&Persona> {
        self.persona(key)
            .or_else(|| self.personas.iter().find(|p| p.answers_to(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VILLA: &str = include_str!("../../fixtures/villa_sonnenhof.json");
    const INNOTECH: &str = include_str!("../../fixtures/innotech_legacy.json");

    #[test]
    fn test_structured_fixture_parses() {
        let scenario = Scenario::from_json(VILLA).unwrap();
        assert_eq!(scenario.personas.len(), 4);
        assert_eq!(scenario.murderer().map(|p| p.name.as_str()), Some("Robert Kleinert"));
        assert_eq!(scenario.timeline.len(), 5);
        assert_eq!(scenario.solution.critical_clues.len(), 3);
    }

    #[test]
    fn test_legacy_fixture_parses() {
        let scenario = Scenario::from_json(INNOTECH).unwrap();
        assert_eq!(scenario.shared_knowledge[0], "FACTS EVERYONE KNOWS:");
        assert_eq!(scenario.timeline.len(), 5);
        assert_eq!(scenario.timeline[2].event, "Estimated time of death");

        let tom = scenario.persona("tom").unwrap();
        assert!(tom.carries_murderer_marker());
        assert_eq!(tom.knows_about_others.len(), 3);

        let elena = scenario.resolve_persona("Elena").unwrap();
        assert_eq!(elena.slug, "elena");
    }

    #[test]
    fn test_serialization_is_structured() {
        let scenario = Scenario::from_json(INNOTECH).unwrap();
        let value: serde_json::Value = serde_json::from_str(&scenario.to_json().unwrap()).unwrap();
        assert!(value["shared_knowledge"].is_array());
        assert!(value["timeline"][0]["time"].is_string());
        assert!(value["personas"][0]["knows_about_others"].is_object());

        let reparsed = Scenario::from_json(&scenario.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, scenario);
    }

    #[test]
    fn test_top_level_keys() {
        let scenario = Scenario::from_json(VILLA).unwrap();
        let value = serde_json::to_value(&scenario).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "intro_message",
                "name",
                "personas",
                "setting",
                "shared_knowledge",
                "solution",
                "timeline",
                "victim"
            ]
        );
    }
}
