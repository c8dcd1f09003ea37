use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Upper bound for `SESSION_TTL_SECS` (30 days).
pub const MAX_SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if the LLM API key is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_model: String,
    pub llm_api_url: String,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub store_path: PathBuf,
    pub export_dir: PathBuf,
    pub default_language: String,
    pub session_ttl_secs: i64,
    pub session_sweep_secs: u64,
    /// Slot keys in order; the last one is the tech stack. `None` uses the default plan.
    pub intake_slots: Option<Vec<String>>,
    pub intake: IntakeSettings,
    pub port: u16,
    pub rust_log: String,
}

/// Knobs for the conversation itself. `None` attempt limits mean unbounded retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeSettings {
    pub min_answer_chars: usize,
    pub max_tech_stack_attempts: Option<u32>,
    pub max_answer_attempts: Option<u32>,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            min_answer_chars: 10,
            max_tech_stack_attempts: None,
            max_answer_attempts: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: require_env("GROQ_API_KEY")?,
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL),
            llm_api_url: env_or("LLM_API_URL", DEFAULT_API_URL),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30)?,
            llm_max_retries: parse_env("LLM_MAX_RETRIES", 0)?,
            store_path: PathBuf::from(env_or("STORE_PATH", "candidates.json")),
            export_dir: PathBuf::from(env_or("EXPORT_DIR", "exports")),
            default_language: env_or("DEFAULT_LANGUAGE", "en"),
            session_ttl_secs: check_session_ttl(parse_env("SESSION_TTL_SECS", 3600)?)?,
            session_sweep_secs: parse_env("SESSION_SWEEP_SECS", 60)?,
            intake_slots: std::env::var("INTAKE_SLOTS").ok().and_then(|raw| parse_slot_list(&raw)),
            intake: IntakeSettings {
                min_answer_chars: parse_env("MIN_ANSWER_CHARS", 10)?,
                max_tech_stack_attempts: parse_optional_env("MAX_TECH_STACK_ATTEMPTS")?,
                max_answer_attempts: parse_optional_env("MAX_ANSWER_ATTEMPTS")?,
            },
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

fn check_session_ttl(secs: i64) -> Result<i64> {
    if !(1..=MAX_SESSION_TTL_SECS).contains(&secs) {
        anyhow::bail!("SESSION_TTL_SECS must be between 1 and {MAX_SESSION_TTL_SECS}, got {secs}");
    }
    Ok(secs)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_optional_env(key: &str) -> Result<Option<u32>> {
    match std::env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .with_context(|| format!("{key} must be a positive integer, got '{raw}'")),
        Err(_) => Ok(None),
    }
}

/// Splits a comma-separated slot list, dropping blanks. Empty input means "use the default".
fn parse_slot_list(raw: &str) -> Option<Vec<String>> {
    let keys: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();
    (!keys.is_empty()).then_some(keys)
}
