//! Consistency validator tests against the fixture scenarios.
//!
//! Each malformation must produce exactly its own error kind.

use mystery_core::testing::{innotech_legacy, villa_sonnenhof};
use mystery_core::validate::PersonaGap;
use mystery_core::{
    render, validate, KnowsAboutOthers, Scenario, StressLevel, TimelineEntry, ValidationError,
};

fn villa() -> Scenario {
    villa_sonnenhof().expect("fixture parses")
}

fn errors(scenario: &Scenario) -> Vec<ValidationError> {
    validate(scenario).err().unwrap_or_default()
}

// =============================================================================
// Valid scenarios
// =============================================================================

#[test]
fn test_fixtures_are_valid() {
    assert_eq!(validate(&villa()), Ok(()));
    assert_eq!(validate(&innotech_legacy().unwrap()), Ok(()));
}

#[test]
fn test_validation_is_idempotent() {
    let mut scenario = villa();
    scenario.solution.critical_clues.truncate(1);
    scenario.personas.pop();
    assert_eq!(validate(&scenario), validate(&scenario));
}

#[test]
fn test_german_timeline_is_valid() {
    let mut scenario = villa();
    scenario.timeline = vec![
        TimelineEntry::new("Freitag 19:00", "Gemeinsames Abendessen"),
        TimelineEntry::new("Freitag 20:30", "Claudia zieht sich in die Bibliothek zurück"),
        TimelineEntry::new("Freitag 21:30 - 23:00", "Geschätzte Todeszeit"),
        TimelineEntry::new("Samstag 8:30", "Sophie findet die Leiche"),
        TimelineEntry::new("Samstag 9:00", "Die Polizei trifft ein"),
    ];
    assert_eq!(validate(&scenario), Ok(()));
}

// =============================================================================
// Single malformations
// =============================================================================

#[test]
fn test_unknown_murderer() {
    let mut scenario = villa();
    scenario.solution.murderer = "nonexistent".to_string();
    assert_eq!(
        errors(&scenario),
        vec![ValidationError::UnknownMurderer {
            slug: "nonexistent".to_string()
        }]
    );
}

#[test]
fn test_three_personas() {
    let mut scenario = villa();
    scenario.personas.retain(|p| p.slug != "isabella");
    assert_eq!(
        errors(&scenario),
        vec![ValidationError::TooFewPersonas { found: 3 }]
    );
}

#[test]
fn test_two_critical_clues() {
    let mut scenario = villa();
    scenario.solution.critical_clues.truncate(2);
    assert_eq!(
        errors(&scenario),
        vec![ValidationError::InsufficientClues { found: 2 }]
    );
}

#[test]
fn test_out_of_order_timeline() {
    let mut scenario = villa();
    scenario.timeline.swap(0, 1);
    let errors = errors(&scenario);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ValidationError::TimelineInconsistent { .. }));
}

#[test]
fn test_dinner_after_discovery_from_free_text() {
    let mut value = serde_json::to_value(villa()).unwrap();
    value["timeline"] = serde_json::json!(["20:00 dinner", "19:00 discovery"]);
    let scenario: Scenario = serde_json::from_value(value).unwrap();

    assert_eq!(scenario.timeline[0], TimelineEntry::new("20:00", "dinner"));
    let errors = errors(&scenario);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), "timeline_inconsistent");
}

#[test]
fn test_window_not_before_discovery() {
    let mut scenario = villa();
    scenario.timeline[3] = TimelineEntry::new("Friday 10:30 PM", "Sophie finds the body");
    scenario.timeline[4] = TimelineEntry::new("Friday 11:30 PM", "Police arrive");
    let errors = errors(&scenario);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].to_string().contains("discovery"), "{}", errors[0]);
}

#[test]
fn test_missing_death_window() {
    let mut scenario = villa();
    scenario.timeline.remove(2);
    assert_eq!(errors(&scenario)[0].kind(), "timeline_inconsistent");
    assert_eq!(errors(&scenario).len(), 1);
}

#[test]
fn test_duplicate_slug() {
    let mut scenario = villa();
    scenario.personas[3].slug = "sophie".to_string();
    assert_eq!(
        errors(&scenario),
        vec![ValidationError::InvalidSlug {
            slug: "sophie".to_string(),
            reason: "slug is used by more than one persona".to_string()
        }]
    );
}

#[test]
fn test_malformed_slug() {
    let mut scenario = villa();
    scenario.personas[3].slug = "Isabella".to_string();
    let errors = errors(&scenario);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ValidationError::InvalidSlug { slug, .. } if slug == "Isabella"
    ));
}

#[test]
fn test_innocent_without_alibi() {
    let mut scenario = villa();
    scenario.personas[3].private_knowledge =
        vec!["Your gallery is facing bankruptcy (350,000 euros in debt)".to_string()];
    assert_eq!(
        errors(&scenario),
        vec![ValidationError::IncompletePersona {
            slug: "isabella".to_string(),
            missing: PersonaGap::Alibi
        }]
    );
}

#[test]
fn test_innocent_without_anything() {
    let mut scenario = villa();
    scenario.personas[0].private_knowledge = vec!["You like tea".to_string()];
    assert_eq!(
        errors(&scenario),
        vec![ValidationError::IncompletePersona {
            slug: "sophie".to_string(),
            missing: PersonaGap::MotiveAndAlibi
        }]
    );
}

#[test]
fn test_knowledge_leak() {
    let mut scenario = villa();
    let secret = scenario.persona("robert").unwrap().private_knowledge[2].to_uppercase();
    scenario.personas[0]
        .knows_about_others
        .insert("robert", format!("Rumour has it:  {secret}"));

    assert_eq!(
        errors(&scenario),
        vec![ValidationError::KnowledgeLeak {
            persona: "sophie".to_string(),
            about: "robert".to_string()
        }]
    );
}

#[test]
fn test_marker_on_wrong_persona() {
    let mut scenario = villa();
    scenario.solution.murderer = "thomas".to_string();
    assert_eq!(
        errors(&scenario),
        vec![ValidationError::MurdererMarkerMismatch {
            expected: "thomas".to_string(),
            marked: vec!["robert".to_string()]
        }]
    );
}

#[test]
fn test_missing_marker() {
    let mut scenario = villa();
    scenario.personas[1].private_knowledge.remove(0);
    assert_eq!(
        errors(&scenario),
        vec![ValidationError::MurdererMarkerMismatch {
            expected: "robert".to_string(),
            marked: Vec::new()
        }]
    );
}

#[test]
fn test_estimate_that_is_not_the_murder() {
    let mut scenario = villa();
    scenario.timeline[2] =
        TimelineEntry::new("Friday 9:30 PM - 11:00 PM", "Estimated arrival of the caterers");
    let errors = errors(&scenario);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0],
        ValidationError::TimelineInconsistent {
            reason: "no estimated time-of-death window".to_string()
        }
    );
}

#[test]
fn test_empty_shared_knowledge() {
    let mut scenario = villa();
    scenario.shared_knowledge.clear();

    let errors = errors(&scenario);
    assert_eq!(errors.len(), scenario.personas.len());
    for (error, slug) in errors.iter().zip(scenario.slugs()) {
        assert_eq!(
            *error,
            ValidationError::MissingContent {
                slug: slug.to_string(),
                placeholder: "shared_facts".to_string()
            }
        );
    }
}

#[test]
fn test_blank_personality() {
    let mut scenario = villa();
    scenario.personas[3].personality = "  ".to_string();
    assert_eq!(
        errors(&scenario),
        vec![ValidationError::MissingContent {
            slug: "isabella".to_string(),
            placeholder: "personality".to_string()
        }]
    );
}

#[test]
fn test_every_persona_of_a_valid_scenario_renders() {
    let mut scenario = villa();
    for persona in &mut scenario.personas {
        persona.knows_about_others = KnowsAboutOthers::new();
    }
    scenario.shared_knowledge.truncate(1);

    assert_eq!(validate(&scenario), Ok(()));
    for slug in scenario.slugs() {
        assert!(
            render(&scenario, slug, StressLevel::calm()).is_ok(),
            "{slug} does not render"
        );
    }
}

// =============================================================================
// Accumulation
// =============================================================================

#[test]
fn test_errors_accumulate() {
    let mut scenario = villa();
    scenario.personas.retain(|p| p.slug != "isabella");
    scenario.solution.critical_clues.truncate(1);
    scenario.solution.murderer = "nonexistent".to_string();

    let kinds: Vec<_> = errors(&scenario).iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec!["too_few_personas", "unknown_murderer", "insufficient_clues"]
    );
}
