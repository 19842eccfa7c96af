//! Suspects and what they know about each other.

use super::text;
use crate::slug::{is_honorific, normalize_slug};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Phrases in `private_knowledge` that tell a persona it is the murderer.
pub const MURDERER_MARKERS: [&str; 2] = ["you are the murderer", "du bist der mörder"];

/// Key under which unattributed gossip from free-text bodies is kept.
pub const OTHERS_KEY: &str = "others";

/// One suspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub slug: String,
    pub name: String,
    pub role: String,
    pub public_description: String,
    /// Voice and demeanor, written to the persona in the second person.
    pub personality: String,
    /// Secret facts, in the order they were written.
    #[serde(deserialize_with = "text::list")]
    pub private_knowledge: Vec<String>,
    #[serde(default)]
    pub knows_about_others: KnowsAboutOthers,
}

impl Persona {
    /// First name, honorifics skipped.
    pub fn first_name(&self) -> &str {
        self.name
            .split_whitespace()
            .find(|part| !is_honorific(part))
            .unwrap_or(&self.name)
    }

    /// Whether any private fact carries a murderer marker.
    pub fn carries_murderer_marker(&self) -> bool {
        self.private_knowledge.iter().any(|fact| {
            let fact = fact.to_lowercase();
            MURDERER_MARKERS.iter().any(|marker| fact.contains(marker))
        })
    }

    /// Whether `key` names this persona: slug, full name or first name, ignoring case.
    pub fn answers_to(&self, key: &str) -> bool {
        let key = key.trim();
        key.eq_ignore_ascii_case(&self.slug)
            || key.to_lowercase() == self.name.to_lowercase()
            || key.to_lowercase() == self.first_name().to_lowercase()
            || normalize_slug(key) == self.slug
    }
}

/// What a persona knows about the others, keyed by the other persona's slug
/// or name. Ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KnowsAboutOthers(BTreeMap<String, String>);

impl KnowsAboutOthers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.insert(key, fragment);
        self
    }

    /// Add a fragment. A second fragment for the same key is appended on a new line.
    pub fn insert(&mut self, key: impl Into<String>, fragment: impl Into<String>) {
        let fragment = fragment.into();
        self.0
            .entry(key.into())
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(&fragment);
            })
            .or_insert(fragment);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The fragment about `persona`, matching keys by slug, full name or first name.
    pub fn about(&self, persona: &Persona) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| persona.answers_to(key))
            .map(|(_, fragment)| fragment.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_text(body: &str) -> Self {
        let (named, loose) = text::named_fragments(body);
        let mut knows = Self::new();
        for (name, fragment) in named {
            knows.insert(name, fragment);
        }
        if !loose.is_empty() {
            knows.insert(OTHERS_KEY, loose.join("\n"));
        }
        knows
    }
}

impl From<BTreeMap<String, String>> for KnowsAboutOthers {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KnowsAboutOthers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut knows = Self::new();
        for (key, fragment) in iter {
            knows.insert(key, fragment);
        }
        knows
    }
}

impl<'de> Deserialize<'de> for KnowsAboutOthers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Body {
            Map(BTreeMap<String, String>),
            Text(String),
        }

        Ok(match Body::deserialize(deserializer)? {
            Body::Map(map) => Self(map),
            Body::Text(body) => Self::from_text(&body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(slug: &str, name: &str) -> Persona {
        Persona {
            slug: slug.to_string(),
            name: name.to_string(),
            role: "Suspect".to_string(),
            public_description: String::new(),
            personality: String::new(),
            private_knowledge: Vec::new(),
            knows_about_others: KnowsAboutOthers::new(),
        }
    }

    #[test]
    fn test_answers_to() {
        let claudia = persona("claudia", "Dr. Claudia von Lichtenberg");
        assert_eq!(claudia.first_name(), "Claudia");
        assert!(claudia.answers_to("claudia"));
        assert!(claudia.answers_to("CLAUDIA"));
        assert!(claudia.answers_to("Dr. Claudia von Lichtenberg"));
        assert!(!claudia.answers_to("Thomas"));

        let jurgen = persona("jurgen", "Jürgen Groß");
        assert!(jurgen.answers_to("Jürgen"));
    }

    #[test]
    fn test_murderer_marker() {
        let mut tom = persona("tom", "Tom Berger");
        assert!(!tom.carries_murderer_marker());
        tom.private_knowledge.push("YOUR SECRETS (YOU ARE THE MURDERER - try to hide it):".into());
        assert!(tom.carries_murderer_marker());

        let mut franz = persona("franz", "Franz Huber");
        franz.private_knowledge.push("DU BIST DER MÖRDER".into());
        assert!(franz.carries_murderer_marker());

        let mut lisa = persona("lisa", "Lisa Hoffman");
        lisa.private_knowledge.push("You are NOT the murderer".into());
        assert!(!lisa.carries_murderer_marker());
    }

    #[test]
    fn test_knows_about_others_from_text() {
        let knows: KnowsAboutOthers = serde_json::from_str(
            r#""- Tom: \"Stressed lately.\"\n- Lisa: \"Loyal.\"\nEveryone avoids the basement.""#,
        )
        .unwrap();
        assert_eq!(knows.get("Tom"), Some("Stressed lately."));
        assert_eq!(knows.get(OTHERS_KEY), Some("Everyone avoids the basement."));
        assert_eq!(knows.about(&persona("lisa", "Lisa Hoffman")), Some("Loyal."));
    }

    #[test]
    fn test_knows_about_others_serializes_as_map() {
        let knows = KnowsAboutOthers::new().with("tom", "a").with("tom", "b");
        let value = serde_json::to_value(&knows).unwrap();
        assert_eq!(value["tom"], "a\nb");
    }
}
