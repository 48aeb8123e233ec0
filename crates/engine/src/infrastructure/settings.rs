//! Engine configuration loaded from the environment.
//!
//! `.env` files are loaded by `main` through `dotenvy` before this runs, so every
//! value here is a plain environment variable. Malformed numbers fall back to the
//! default with a warning rather than aborting startup.

use std::str::FromStr;

use mindspark_domain::PityConfig;

use crate::infrastructure::ollama::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};

pub const DEFAULT_DATABASE_URL: &str = "mindspark.db";
/// Enough for three standard packs.
pub const DEFAULT_STARTING_BALANCE: u64 = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// SQLite file path, or `:memory:` for a throwaway database.
    pub database_url: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    /// Per-request LLM timeout. Unset means the provider may take as long as it likes.
    pub ollama_timeout_secs: Option<u64>,
    pub starting_balance: u64,
    pub pity: PityConfig,
    /// Seed for reproducible pack plans. Unset uses thread-local entropy.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            ollama_timeout_secs: None,
            starting_balance: DEFAULT_STARTING_BALANCE,
            pity: PityConfig::default(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let threshold = parse_or(get("PITY_THRESHOLD"), "PITY_THRESHOLD", defaults.pity.threshold);
        let candidate = PityConfig::with_threshold(threshold);
        let pity = match candidate.validate() {
            Ok(()) => candidate,
            Err(e) => {
                tracing::warn!(threshold, error = %e, "Invalid PITY_THRESHOLD, using default");
                defaults.pity.clone()
            }
        };

        Self {
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            ollama_base_url: get("OLLAMA_BASE_URL")
                .or_else(|| get("OLLAMA_URL"))
                .unwrap_or(defaults.ollama_base_url),
            ollama_model: get("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            ollama_timeout_secs: parse_optional(get("OLLAMA_TIMEOUT_SECS"), "OLLAMA_TIMEOUT_SECS"),
            starting_balance: parse_or(
                get("STARTING_BALANCE"),
                "STARTING_BALANCE",
                defaults.starting_balance,
            ),
            pity,
            rng_seed: parse_optional(get("RNG_SEED"), "RNG_SEED"),
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Unparseable setting, using default");
            default
        }),
    }
}

fn parse_optional<T: FromStr>(raw: Option<String>, key: &'static str) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Unparseable setting, ignoring");
            None
        }
    }
}
