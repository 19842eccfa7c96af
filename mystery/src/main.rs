//! Murder mystery command-line front end.
//!
//! Validates and renders scenarios, manages the prompt template store and
//! runs interrogations against the AI service.
//!
//! ```bash
//! cargo run -p mystery -- validate case.json
//! cargo run -p mystery -- render case.json robert --stress 7 --difficulty hard
//! cargo run -p mystery -- seed
//! ```

mod config;
mod play;

use ai_client::{AiClient, LogRelay};
use chrono::Utc;
use config::{parse_config_from_args, CliConfig};
use mystery_core::slug::normalize_slug;
use mystery_core::store::{load_scenario, publish_scenario, seed_defaults, stored_renderer};
use mystery_core::{
    validate, GameRegistry, Interrogation, MemoryTemplateStore, PublishError, Scenario,
    ScenarioAuthor, StressLevel, TemplateStore,
};
use std::error::Error;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_help();
        return Ok(());
    };
    let config = match CliConfig::from_env()
        .map_err(|e| format!("MYSTERY_DIFFICULTY: {e}"))
        .and_then(|env| parse_config_from_args(&args[1..], env).map_err(|e| e.to_string()))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };
    let relay = LogRelay::from_env().with_source("mystery");

    match command.as_str() {
        "validate" => run_validate(&config).await,
        "render" => run_render(&config).await,
        "seed" => run_seed(&config, &relay).await,
        "templates" => run_templates(&config).await,
        "publish" => run_publish(&config, &relay).await,
        "generate" => run_generate(&config, &relay).await,
        "play" => run_play(&config, &relay).await,
        "cleanup" => run_cleanup(&config, &relay).await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    }
}

async fn read_scenario(path: &str) -> Result<Scenario, Box<dyn Error>> {
    let json = tokio::fs::read_to_string(path).await?;
    Ok(Scenario::from_json(&json)?)
}

async fn run_validate(config: &CliConfig) -> Result<(), Box<dyn Error>> {
    let Some(path) = config.first() else {
        eprintln!("Usage: mystery validate <scenario.json>");
        std::process::exit(2);
    };
    let scenario = read_scenario(path).await?;

    match validate(&scenario) {
        Ok(()) => {
            println!("{}: valid ({} personas)", scenario.name, scenario.personas.len());
            Ok(())
        }
        Err(errors) => {
            println!("{}: {} problem(s)", scenario.name, errors.len());
            for error in &errors {
                println!("  [{}] {error}", error.kind());
            }
            std::process::exit(1);
        }
    }
}

async fn run_render(config: &CliConfig) -> Result<(), Box<dyn Error>> {
    let store = MemoryTemplateStore::open(&config.store_path).await?;

    // `render <file> <slug>` or `render <slug>` against the stored scenario
    let (scenario, slug) = match config.positional.as_slice() {
        [path, slug] => (read_scenario(path).await?, slug),
        [slug] => (load_scenario(&store, &config.scenario_key)?, slug),
        _ => {
            eprintln!("Usage: mystery render [scenario.json] <persona> [--stress N]");
            std::process::exit(2);
        }
    };

    let renderer = stored_renderer(&store)?.with_difficulty(config.difficulty);
    let stress = StressLevel::after_questions(config.questions);
    println!("{}", renderer.render(&scenario, slug, stress)?);
    Ok(())
}

async fn run_seed(config: &CliConfig, relay: &LogRelay) -> Result<(), Box<dyn Error>> {
    let mut store = MemoryTemplateStore::open(&config.store_path).await?;
    let seeded = seed_defaults(&mut store);
    store.save_json(&config.store_path).await?;

    println!("Seeded {seeded} templates into {}", config.store_path.display());
    relay.info(format!("Seeded {seeded} prompt templates"));
    Ok(())
}

async fn run_templates(config: &CliConfig) -> Result<(), Box<dyn Error>> {
    let store = MemoryTemplateStore::open(&config.store_path).await?;
    if store.is_empty() {
        println!("No templates in {}. Run `mystery seed` first.", config.store_path.display());
        return Ok(());
    }

    for summary in store.list_all() {
        println!(
            "{:<28} {:<40} {}",
            summary.key,
            summary.name,
            summary.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

/// Store key for a published scenario: its folded name.
fn scenario_key_for(scenario: &Scenario) -> String {
    normalize_slug(&scenario.name).replace('-', "_")
}

async fn store_scenario(
    config: &CliConfig,
    scenario: &Scenario,
    key: &str,
    relay: &LogRelay,
) -> Result<(), Box<dyn Error>> {
    let mut store = MemoryTemplateStore::open(&config.store_path).await?;
    match publish_scenario(&mut store, key, &scenario.name, scenario) {
        Ok(record) => {
            store.save_json(&config.store_path).await?;
            println!("Published {:?} as {}", scenario.name, record.key);
            relay.info(format!("Scenario {} published", record.key));
            Ok(())
        }
        Err(PublishError::Invalid(errors)) => {
            println!("{}: not published, {} problem(s)", scenario.name, errors.len());
            for error in &errors {
                println!("  [{}] {error}", error.kind());
            }
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_publish(config: &CliConfig, relay: &LogRelay) -> Result<(), Box<dyn Error>> {
    let Some(path) = config.first() else {
        eprintln!("Usage: mystery publish <scenario.json> [key]");
        std::process::exit(2);
    };
    let scenario = read_scenario(path).await?;
    let key = config
        .positional
        .get(1)
        .cloned()
        .unwrap_or_else(|| scenario_key_for(&scenario));
    store_scenario(config, &scenario, &key, relay).await
}

async fn run_generate(config: &CliConfig, relay: &LogRelay) -> Result<(), Box<dyn Error>> {
    let store = MemoryTemplateStore::open(&config.store_path).await?;
    let author = ScenarioAuthor::from_store(AiClient::from_env()?, &store)
        .with_difficulty(config.difficulty);

    let scenario = match author.author(&config.joined()).await {
        Ok(scenario) => scenario,
        Err(e) => {
            relay.error(format!("Scenario generation failed: {e}"));
            return Err(e.into());
        }
    };
    let key = scenario_key_for(&scenario);
    store_scenario(config, &scenario, &key, relay).await
}

async fn run_play(config: &CliConfig, relay: &LogRelay) -> Result<(), Box<dyn Error>> {
    let store = MemoryTemplateStore::open(&config.store_path).await?;
    let scenario = match store.find_by_key(&config.scenario_key) {
        Some(_) => load_scenario(&store, &config.scenario_key)?,
        None => mystery_core::store::default_scenario()?,
    };

    let renderer = stored_renderer(&store)?;
    let session = Interrogation::with_renderer(AiClient::from_env()?, Arc::new(scenario), renderer)
        .with_difficulty(config.difficulty);

    play::run_play(session, &config.scenario_key, &config.games_path, relay).await
}

async fn run_cleanup(config: &CliConfig, relay: &LogRelay) -> Result<(), Box<dyn Error>> {
    let mut registry = GameRegistry::open(&config.games_path).await?;
    let report = registry.cleanup_expired(Utc::now());
    registry.save_json(&config.games_path).await?;

    println!(
        "Deleted {} expired games and {} messages",
        report.games_deleted, report.messages_deleted
    );
    relay.info(format!(
        "Expired games cleaned up: {} games, {} messages",
        report.games_deleted, report.messages_deleted
    ));
    Ok(())
}

fn print_help() {
    println!("Murder Mystery - scenario tools and interrogation");
    println!();
    println!("USAGE:");
    println!("  mystery <COMMAND> [ARGS] [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  validate <file>            Check a scenario for consistency");
    println!("  render [file] <persona>    Print a persona's instruction");
    println!("  seed                       Write the built-in templates to the store");
    println!("  templates                  List stored templates");
    println!("  publish <file> [key]       Validate and store a scenario");
    println!("  generate [wishes...]       Generate, validate and store a new scenario");
    println!("  play                       Question the suspects of a stored scenario");
    println!("  cleanup                    Delete expired games");
    println!();
    println!("OPTIONS:");
    println!("  --store <PATH>        Template store (default: prompt_templates.json, env MYSTERY_STORE)");
    println!("  --games <PATH>        Games file (default: games.json, env MYSTERY_GAMES)");
    println!("  --scenario <KEY>      Stored scenario (default: default_scenario)");
    println!("  --difficulty <LEVEL>  easy, medium or hard (env MYSTERY_DIFFICULTY)");
    println!("  --stress <N>          Questions already asked, for render");
    println!();
    println!("ENVIRONMENT:");
    println!("  AI_SERVICE_URL, AI_SERVICE_API_KEY   AI service for generate and play");
    println!("  LARAVEL_URL                          Log relay target");
    println!("  RUST_LOG                             Log filter (default: info)");
}
