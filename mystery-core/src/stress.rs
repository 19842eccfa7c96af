//! Interrogation pressure.
//!
//! Every question put to a persona raises its stress. The stress level
//! selects a stance, and the stance selects the behavioral directive
//! rendered into the `{stress_modifier}` placeholder. Private knowledge is
//! never rewritten; only this appended directive changes.

use serde::{Deserialize, Serialize};

/// Stress added per question.
pub const STRESS_PER_QUESTION: f32 = 0.1;

/// Questions after which a persona gets tired and careless.
pub const FATIGUE_AFTER_QUESTIONS: u32 = 5;

const EVASIVE_ABOVE: f32 = 0.3;
const SLIPPING_ABOVE: f32 = 0.6;
const ADMISSION_FROM: f32 = 0.9;

/// How far a persona has been pressed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StressLevel {
    level: f32,
    questions: u32,
}

impl StressLevel {
    /// No pressure at all.
    pub fn calm() -> Self {
        Self::default()
    }

    /// The level reached after `questions` questions.
    pub fn after_questions(questions: u32) -> Self {
        Self {
            level: (questions as f32 * STRESS_PER_QUESTION).min(1.0),
            questions,
        }
    }

    /// An explicit level, clamped to `[0, 1]`.
    pub fn with_level(level: f32) -> Self {
        Self {
            level: if level.is_nan() { 0.0 } else { level.clamp(0.0, 1.0) },
            questions: 0,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn questions(&self) -> u32 {
        self.questions
    }

    /// Account for one more question.
    pub fn record_question(&mut self) {
        self.level = (self.level + STRESS_PER_QUESTION).min(1.0);
        self.questions = self.questions.saturating_add(1);
    }

    pub fn stance(&self) -> Stance {
        if self.level >= ADMISSION_FROM {
            Stance::ReluctantAdmission
        } else if self.level > SLIPPING_ABOVE {
            Stance::Slipping
        } else if self.level > EVASIVE_ABOVE {
            Stance::Evasive
        } else {
            Stance::Composed
        }
    }

    /// The directive for the `{stress_modifier}` placeholder. Empty when calm.
    pub fn modifier(&self, is_murderer: bool) -> String {
        let stance = self.stance();
        let mut text = String::new();

        if stance > Stance::Composed {
            text.push_str("=== CURRENT STATE ===\n");
            text.push_str(&format!("Stress Level: {:.0}%\n", self.level * 100.0));
        }

        if stance >= Stance::Evasive {
            text.push_str(
                "You are becoming noticeably more nervous. Your answers are getting shorter, \
                 you hesitate more and avoid the sensitive topic.\n",
            );
        }

        if stance >= Stance::Slipping {
            text.push_str(
                "You are very stressed. You are making small mistakes in your statements. \
                 When confronted directly, you might slip up.\n",
            );
        }

        if stance >= Stance::ReluctantAdmission {
            if is_murderer {
                text.push_str(
                    "You can no longer keep up every detail of your story. You may reluctantly \
                     concede a peripheral fact you have been directly confronted with, but you \
                     never confess the crime itself.\n",
                );
            } else {
                text.push_str(
                    "You can no longer hold back. When pressed on a secret you have been asked \
                     about repeatedly, you reluctantly admit it, but only what was asked.\n",
                );
            }
        }

        if self.questions > FATIGUE_AFTER_QUESTIONS {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&format!(
                "You have already been questioned {} times. You are getting tired and more careless.\n",
                self.questions
            ));
        }

        text
    }
}

/// The persona's stance toward a sensitive topic, ordered from least to most revealing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stance {
    Composed,
    Evasive,
    Slipping,
    ReluctantAdmission,
}

impl Stance {
    pub fn name(&self) -> &'static str {
        match self {
            Stance::Composed => "composed",
            Stance::Evasive => "evasive",
            Stance::Slipping => "slipping",
            Stance::ReluctantAdmission => "reluctant admission",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calm_has_no_modifier() {
        assert_eq!(StressLevel::calm().stance(), Stance::Composed);
        assert!(StressLevel::calm().modifier(false).is_empty());
    }

    #[test]
    fn test_record_question_accumulates() {
        let mut stress = StressLevel::calm();
        for _ in 0..4 {
            stress.record_question();
        }
        assert_eq!(stress.questions(), 4);
        assert_eq!(stress.stance(), Stance::Evasive);
    }

    #[test]
    fn test_level_is_clamped() {
        let mut stress = StressLevel::after_questions(30);
        assert_eq!(stress.level(), 1.0);
        stress.record_question();
        assert_eq!(stress.level(), 1.0);
        assert_eq!(StressLevel::with_level(-2.0).level(), 0.0);
        assert_eq!(StressLevel::with_level(f32::NAN).level(), 0.0);
    }

    #[test]
    fn test_stance_is_monotonic() {
        let mut previous = Stance::Composed;
        for step in 0..=100 {
            let stance = StressLevel::with_level(step as f32 / 100.0).stance();
            assert!(stance >= previous, "stance fell at {step}");
            previous = stance;
        }
        assert_eq!(previous, Stance::ReluctantAdmission);
    }

    #[test]
    fn test_modifier_grows_with_pressure() {
        let evasive = StressLevel::with_level(0.4).modifier(false);
        let slipping = StressLevel::with_level(0.7).modifier(false);
        assert!(evasive.contains("more nervous"));
        assert!(!evasive.contains("slip up"));
        assert!(slipping.contains("more nervous"));
        assert!(slipping.contains("slip up"));
    }

    #[test]
    fn test_murderer_never_told_to_confess() {
        let text = StressLevel::with_level(1.0).modifier(true);
        assert!(text.contains("never confess the crime"));
        let innocent = StressLevel::with_level(1.0).modifier(false);
        assert!(innocent.contains("reluctantly admit"));
    }

    #[test]
    fn test_fatigue_after_many_questions() {
        let text = StressLevel::after_questions(6).modifier(false);
        assert!(text.contains("questioned 6 times"));
        assert!(!StressLevel::after_questions(5).modifier(false).contains("questioned"));
    }
}
