//! Command-line configuration.
//!
//! Defaults come from the environment (`MYSTERY_STORE`, `MYSTERY_GAMES`,
//! `MYSTERY_DIFFICULTY`); flags after the subcommand override them.

use mystery_core::prompts::DEFAULT_SCENARIO_KEY;
use mystery_core::{Difficulty, UnknownDifficulty};
use std::path::PathBuf;

const DEFAULT_STORE_PATH: &str = "prompt_templates.json";
const DEFAULT_GAMES_PATH: &str = "games.json";

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub store_path: PathBuf,
    pub games_path: PathBuf,
    pub difficulty: Difficulty,
    /// Questions already asked, for `render`.
    pub questions: u32,
    /// Stored scenario to use when no file is given.
    pub scenario_key: String,
    /// Arguments that are not flags, in order.
    pub positional: Vec<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            games_path: PathBuf::from(DEFAULT_GAMES_PATH),
            difficulty: Difficulty::default(),
            questions: 0,
            scenario_key: DEFAULT_SCENARIO_KEY.to_string(),
            positional: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> Result<Self, UnknownDifficulty> {
        let mut config = Self::default();
        if let Ok(path) = std::env::var("MYSTERY_STORE") {
            config.store_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("MYSTERY_GAMES") {
            config.games_path = PathBuf::from(path);
        }
        if let Ok(difficulty) = std::env::var("MYSTERY_DIFFICULTY") {
            config.difficulty = difficulty.parse()?;
        }
        Ok(config)
    }

    /// The first positional argument.
    pub fn first(&self) -> Option<&str> {
        self.positional.first().map(String::as_str)
    }

    /// All positional arguments joined with spaces.
    pub fn joined(&self) -> String {
        self.positional.join(" ")
    }
}

/// Apply the flags in `args` (everything after the subcommand) to `config`.
pub fn parse_config_from_args(
    args: &[String],
    mut config: CliConfig,
) -> Result<CliConfig, UnknownDifficulty> {
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--store" => {
                if let Some(path) = args.get(i + 1) {
                    config.store_path = PathBuf::from(path);
                    i += 1;
                }
            }
            "--games" => {
                if let Some(path) = args.get(i + 1) {
                    config.games_path = PathBuf::from(path);
                    i += 1;
                }
            }
            "--difficulty" => {
                if let Some(difficulty) = args.get(i + 1) {
                    config.difficulty = difficulty.parse()?;
                    i += 1;
                }
            }
            "--stress" => {
                if let Some(questions) = args.get(i + 1) {
                    config.questions = questions.parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--scenario" => {
                if let Some(key) = args.get(i + 1) {
                    config.scenario_key = key.clone();
                    i += 1;
                }
            }
            other => config.positional.push(other.to_string()),
        }
        i += 1;
    }

    Ok(config)
}
