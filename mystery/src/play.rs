//! Line-oriented interrogation.
//!
//! Each input line is `<persona> <question>`; lines starting with `#` are
//! commands. Every exchange is recorded in the game registry.

use ai_client::{AiService, LogRelay, Role};
use chrono::Duration;
use mystery_core::registry::DEFAULT_GAME_TTL_HOURS;
use mystery_core::{GameRegistry, Interrogation, Scenario};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::Path;

pub async fn run_play<E: AiService>(
    mut session: Interrogation<E>,
    scenario_key: &str,
    games_path: &Path,
    relay: &LogRelay,
) -> Result<(), Box<dyn Error>> {
    let mut registry = GameRegistry::open(games_path).await?;
    let game = registry.create(scenario_key, Duration::hours(DEFAULT_GAME_TTL_HOURS));
    registry.save_json(games_path).await?;
    relay.info(format!("Game {game} started with scenario {scenario_key}"));

    print_intro(session.scenario());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            match command.trim() {
                "quit" | "exit" => {
                    println!("Goodbye!");
                    break;
                }
                "clues" => {
                    if session.clues().is_empty() {
                        println!("[CLUES] none yet");
                    }
                    for clue in session.clues() {
                        println!("[CLUE] {clue}");
                    }
                }
                "stress" => {
                    for persona in &session.scenario().personas {
                        let stress = session.stress(&persona.slug);
                        println!(
                            "[STRESS] {}: {:.0}% ({}, {} questions)",
                            persona.slug,
                            stress.level() * 100.0,
                            stress.stance().name(),
                            stress.questions()
                        );
                    }
                }
                "help" => print_commands(),
                other => println!("[ERROR] Unknown command: #{other}"),
            }
            stdout.flush().ok();
            continue;
        }

        let Some((slug, question)) = line.split_once(char::is_whitespace) else {
            println!("[ERROR] Usage: <persona> <question>");
            continue;
        };
        let Some(slug) = session.scenario().resolve_persona(slug).map(|p| p.slug.clone()) else {
            println!("[ERROR] Nobody called {slug:?} is involved in this case");
            continue;
        };

        match session.ask(&slug, question.trim()).await {
            Ok(answer) => {
                println!("{slug}: {}", answer.reply);
                if let Some(clue) = &answer.clue {
                    println!("[CLUE] {clue}");
                }
                if let Some(hint) = &answer.hint {
                    println!("[HINT] {hint}");
                }
                registry.record_message(game, &slug, Role::Player, question.trim())?;
                registry.record_message(game, &slug, Role::Persona, &answer.reply)?;
                registry.save_json(games_path).await?;
            }
            Err(e) => {
                tracing::warn!(persona = %slug, error = %e, "Question failed");
                println!("[ERROR] {e}");
            }
        }
        stdout.flush().ok();
    }

    Ok(())
}

fn print_intro(scenario: &Scenario) {
    println!("=== {} ===", scenario.name);
    println!();
    println!("{}", scenario.intro_message);
    println!();
    println!("Suspects:");
    for persona in &scenario.personas {
        println!("  {:<10} {} ({})", persona.slug, persona.name, persona.role);
    }
    println!();
    print_commands();
}

fn print_commands() {
    println!("Commands:");
    println!("  <persona> <question> - Question a suspect");
    println!("  #clues               - Show discovered clues");
    println!("  #stress              - Show every suspect's stress");
    println!("  #quit                - Leave the game");
    println!();
}
