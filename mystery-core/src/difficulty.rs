//! Difficulty tiers.
//!
//! Difficulty only changes how the murderer behaves under questioning. It is
//! rendered into the murderer's personality as a directive for the dialogue
//! engine; innocents are unaffected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How hard the murderer is to break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a tier name. Accepts the German tags used by older generator prompts.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "einfach" | "leicht" => Some(Difficulty::Easy),
            "medium" | "mittel" | "normal" => Some(Difficulty::Medium),
            "hard" | "schwer" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// The behavioral directive appended to the murderer's personality.
    pub fn murderer_directive(&self) -> &'static str {
        match self {
            Difficulty::Easy => {
                "GAME INSTRUCTIONS FOR THE MURDERER (DIFFICULTY: EASY):\n\
                 - You are emotionally unstable and visibly nervous\n\
                 - Your story contains contradictions you cannot explain\n\
                 - Show guilt when confronted with evidence\n\
                 - Good, direct questions can break you"
            }
            Difficulty::Medium => {
                "GAME INSTRUCTIONS FOR THE MURDERER (DIFFICULTY: MEDIUM):\n\
                 - Basically stay calm, but occasionally show nervousness\n\
                 - Make small mistakes in your story (e.g., times that don't quite match)\n\
                 - When strongly pressured, become defensive but don't give up immediately\n\
                 - Your lies should sound logical, but show contradictions when questioned closely"
            }
            Difficulty::Hard => {
                "GAME INSTRUCTIONS FOR THE MURDERER (DIFFICULTY: HARD):\n\
                 - Show NO emotional signs of guilt\n\
                 - Keep every statement logically consistent with what you said before\n\
                 - NEVER confess voluntarily\n\
                 - Only concede a point when confronted with an irrefutable contradiction or evidence"
            }
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unknown difficulty names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty {0:?}, expected easy, medium or hard")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::parse(s).ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}
