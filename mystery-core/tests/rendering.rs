//! Persona instruction rendering tests.
//!
//! Covers determinism, knowledge isolation between personas, the murderer
//! directive and the stress modifier.

use mystery_core::testing::{innotech_legacy, villa_sonnenhof};
use mystery_core::{
    render, Difficulty, KnowledgePartition, KnowsAboutOthers, Placeholders, PersonaPrompt,
    PromptRenderer, RenderError, Scenario, StressLevel,
};

fn villa() -> Scenario {
    villa_sonnenhof().expect("fixture parses")
}

// =============================================================================
// Basic rendering
// =============================================================================

#[test]
fn test_render_is_deterministic() {
    let scenario = villa();
    for slug in scenario.slugs() {
        let stress = StressLevel::after_questions(4);
        assert_eq!(
            render(&scenario, slug, stress).unwrap(),
            render(&scenario, slug, stress).unwrap()
        );
    }
}

#[test]
fn test_render_unknown_persona() {
    let err = render(&villa(), "nobody", StressLevel::calm()).unwrap_err();
    assert_eq!(
        err,
        RenderError::UnknownPersona {
            slug: "nobody".to_string()
        }
    );
}

#[test]
fn test_render_fills_every_placeholder() {
    let scenario = villa();
    let rendered = render(&scenario, "sophie", StressLevel::calm()).unwrap();

    assert!(rendered.starts_with("You are Sophie Berger, Personal Assistant at Villa Sonnenhof."));
    for name in PersonaPrompt::PLACEHOLDERS {
        assert!(!rendered.contains(&format!("{{{name}}}")), "{name} left unfilled");
    }
    assert!(rendered.contains("- Friday 9:30 PM - 11:00 PM: Estimated time of death"));
    assert!(rendered.contains("- Robert Kleinert: Robert has been acting nervous lately"));
    assert!(rendered.contains("- You had a secret affair with Thomas, the son"));
}

#[test]
fn test_company_name_override() {
    let renderer = PromptRenderer::standard()
        .unwrap()
        .with_company_name("Lichtenberg Estate");
    let rendered = renderer.render(&villa(), "thomas", StressLevel::calm()).unwrap();
    assert!(rendered.contains("Son and Heir at Lichtenberg Estate."));
}

// =============================================================================
// Knowledge isolation
// =============================================================================

fn assert_isolated(scenario: &Scenario) {
    for slug in scenario.slugs() {
        let rendered = render(scenario, slug, StressLevel::calm()).unwrap();
        let partition = KnowledgePartition::for_persona(scenario, slug).unwrap();

        for other in scenario.personas.iter().filter(|p| p.slug != slug) {
            for secret in &other.private_knowledge {
                assert!(
                    !rendered.contains(secret.as_str()) || partition.exposes(secret),
                    "{slug} sees {}'s secret {secret:?}",
                    other.slug
                );
            }
        }
    }
}

#[test]
fn test_personas_do_not_see_each_others_secrets() {
    assert_isolated(&villa());
}

#[test]
fn test_legacy_personas_do_not_see_each_others_secrets() {
    assert_isolated(&innotech_legacy().unwrap());
}

#[test]
fn test_own_secrets_are_rendered() {
    let scenario = villa();
    let rendered = render(&scenario, "isabella", StressLevel::calm()).unwrap();
    for secret in &scenario.persona("isabella").unwrap().private_knowledge {
        assert!(rendered.contains(secret.as_str()));
    }
}

// =============================================================================
// Murderer directive
// =============================================================================

#[test]
fn test_directive_only_for_murderer() {
    let scenario = villa();
    for difficulty in Difficulty::ALL {
        let renderer = PromptRenderer::standard().unwrap().with_difficulty(difficulty);
        for slug in scenario.slugs() {
            let rendered = renderer.render(&scenario, slug, StressLevel::calm()).unwrap();
            assert_eq!(
                rendered.contains(difficulty.murderer_directive()),
                slug == "robert",
                "{slug} at {difficulty}"
            );
        }
    }
}

#[test]
fn test_directive_follows_personality() {
    let scenario = villa();
    let renderer = PromptRenderer::standard()
        .unwrap()
        .with_difficulty(Difficulty::Hard);
    let prompt = renderer.prompt_for(&scenario, "robert", StressLevel::calm()).unwrap();
    assert!(prompt.personality.starts_with("You are Robert Kleinert, the curator."));
    assert!(prompt.personality.ends_with(Difficulty::Hard.murderer_directive()));
}

// =============================================================================
// Stress
// =============================================================================

#[test]
fn test_calm_persona_has_no_state_section() {
    let rendered = render(&villa(), "thomas", StressLevel::calm()).unwrap();
    assert!(!rendered.contains("CURRENT STATE"));
}

#[test]
fn test_stress_changes_only_the_modifier() {
    let scenario = villa();
    let calm = PromptRenderer::standard()
        .unwrap()
        .prompt_for(&scenario, "thomas", StressLevel::calm())
        .unwrap();
    let pressed = PromptRenderer::standard()
        .unwrap()
        .prompt_for(&scenario, "thomas", StressLevel::after_questions(7))
        .unwrap();

    assert_eq!(calm.private_knowledge, pressed.private_knowledge);
    assert_eq!(calm.personality, pressed.personality);
    assert!(calm.stress_modifier.is_empty());
    assert!(pressed.stress_modifier.contains("Stress Level: 70%"));
    assert!(pressed.stress_modifier.contains("questioned 7 times"));
}

#[test]
fn test_murderer_never_confesses_at_high_stress() {
    let scenario = villa();
    let robert = render(&scenario, "robert", StressLevel::with_level(0.95)).unwrap();
    let sophie = render(&scenario, "sophie", StressLevel::with_level(0.95)).unwrap();
    assert!(robert.contains("never confess the crime itself"));
    assert!(!sophie.contains("never confess the crime itself"));
    assert!(sophie.contains("reluctantly admit"));
}

// =============================================================================
// Free-text scenarios and custom templates
// =============================================================================

#[test]
fn test_legacy_scenario_renders() {
    let scenario = innotech_legacy().unwrap();
    let rendered = render(&scenario, "tom", StressLevel::calm()).unwrap();

    assert!(rendered.starts_with("You are Tom Berger, Lead Developer at InnoTech."));
    assert!(rendered.contains("\nYOUR SECRETS (YOU ARE THE MURDERER - try to hide it):\n"));
    assert!(rendered.contains("- You cut your hand in the process (cut on left hand)"));
    assert!(rendered.contains("- Elena Schmidt: "));
    assert!(rendered.contains("- Monday 7:30 AM: Elena (CEO) finds the body"));
}

#[test]
fn test_custom_template() {
    let renderer =
        PromptRenderer::from_body("{persona_name} knows:\n{knows_about_others}\n{stress_modifier}")
            .unwrap();
    let rendered = renderer
        .render(&villa(), "isabella", StressLevel::calm())
        .unwrap();
    assert!(rendered.starts_with("Isabella Hartmann knows:\n- Robert Kleinert: "));
    assert!(!rendered.contains("Villa Sonnenhof"));
}

#[test]
fn test_custom_template_with_unknown_placeholder() {
    let err = PromptRenderer::from_body("You are {persona_name}. Mood: {mood}").unwrap_err();
    assert!(matches!(
        err,
        RenderError::UnknownPlaceholder { ref placeholder, .. } if placeholder == "mood"
    ));
}

#[test]
fn test_empty_required_field() {
    let mut scenario = villa();
    scenario.personas[0].personality.clear();
    let err = render(&scenario, "sophie", StressLevel::calm()).unwrap_err();
    assert_eq!(
        err,
        RenderError::MissingField {
            placeholder: "personality".to_string()
        }
    );
}

#[test]
fn test_persona_without_gossip_renders() {
    let mut scenario = villa();
    scenario.personas[2].knows_about_others = KnowsAboutOthers::new();
    let rendered = render(&scenario, "thomas", StressLevel::calm()).unwrap();
    assert!(rendered.contains("## What You Know About Others"));
    assert!(!rendered.contains("Isabella asked your mother for a loan"));
}
