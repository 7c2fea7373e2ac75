//! quizgrade configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level quizgrade configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizgradeConfig {
    /// Directory of quiz TOML files.
    #[serde(default = "default_quiz_dir")]
    pub quiz_dir: PathBuf,
    /// JSON Lines file that graded attempts are appended to.
    #[serde(default = "default_attempts_path")]
    pub attempts_path: PathBuf,
    /// Passing score written into new quizzes by `quizgrade init`.
    #[serde(default = "default_passing_score")]
    pub default_passing_score: f64,
    /// Max concurrent submissions in a batch.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

fn default_quiz_dir() -> PathBuf {
    PathBuf::from("./quizzes")
}
fn default_attempts_path() -> PathBuf {
    PathBuf::from("./quizgrade-data/attempts.jsonl")
}
fn default_passing_score() -> f64 {
    60.0
}
fn default_parallelism() -> usize {
    4
}

impl Default for QuizgradeConfig {
    fn default() -> Self {
        Self {
            quiz_dir: default_quiz_dir(),
            attempts_path: default_attempts_path(),
            default_passing_score: default_passing_score(),
            parallelism: default_parallelism(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    // Substituted values are never rescanned.
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + len];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizgrade.toml` in the current directory
/// 2. `~/.config/quizgrade/config.toml`
///
/// Environment variable overrides: `QUIZGRADE_QUIZ_DIR`, `QUIZGRADE_ATTEMPTS_PATH`.
pub fn load_config() -> Result<QuizgradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizgradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizgrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuizgradeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => QuizgradeConfig::default(),
    };

    // Apply env var overrides
    if let Ok(dir) = std::env::var("QUIZGRADE_QUIZ_DIR") {
        config.quiz_dir = PathBuf::from(dir);
    }
    if let Ok(attempts) = std::env::var("QUIZGRADE_ATTEMPTS_PATH") {
        config.attempts_path = PathBuf::from(attempts);
    }

    config.quiz_dir = resolve_path(&config.quiz_dir);
    config.attempts_path = resolve_path(&config.attempts_path);

    anyhow::ensure!(
        (0.0..=100.0).contains(&config.default_passing_score),
        "default_passing_score must be between 0 and 100, got {}",
        config.default_passing_score
    );
    config.parallelism = config.parallelism.max(1);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizgrade"))
}
