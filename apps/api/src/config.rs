use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::generation::orchestrator::OrchestratorConfig;
use crate::validation::ValidationPolicy;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent → history is kept in memory only.
    pub database_url: Option<String>,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub generator_timeout: Duration,
    pub validation_policy: ValidationPolicy,
    pub record_fallback_batches: bool,
    pub presentation_delay: Option<(Duration, Duration)>,
    pub cache_max_age: Option<Duration>,
    /// Main and side catalog files; both must be set to replace the built-in catalog.
    pub preset_paths: Option<(PathBuf, PathBuf)>,
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let preset_paths = match (
            optional_env("PRESET_MAIN_DISHES_PATH"),
            optional_env("PRESET_SIDE_DISHES_PATH"),
        ) {
            (Some(main), Some(side)) => Some((PathBuf::from(main), PathBuf::from(side))),
            (None, None) => None,
            _ => bail!("PRESET_MAIN_DISHES_PATH and PRESET_SIDE_DISHES_PATH must be set together"),
        };

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            generator_timeout: Duration::from_secs(
                parse_env("GENERATOR_TIMEOUT_SECS")?.unwrap_or(60),
            ),
            validation_policy: optional_env("VALIDATION_POLICY")
                .map(|v| v.parse::<ValidationPolicy>())
                .transpose()
                .map_err(anyhow::Error::msg)
                .context("VALIDATION_POLICY must be 'warn' or 'retry'")?
                .unwrap_or_default(),
            record_fallback_batches: parse_env("RECORD_FALLBACK_BATCHES")?.unwrap_or(false),
            presentation_delay: optional_env("PRESENTATION_DELAY_MS")
                .map(|v| parse_delay_range(&v))
                .transpose()
                .context("PRESENTATION_DELAY_MS must look like '300-800'")?,
            cache_max_age: parse_env("CACHE_MAX_AGE_SECS")?.map(Duration::from_secs),
            preset_paths,
            rng_seed: parse_env("RNG_SEED")?,
        })
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            generator_timeout: self.generator_timeout,
            validation_policy: self.validation_policy,
            record_fallback_batches: self.record_fallback_batches,
            presentation_delay: self.presentation_delay,
            ..Default::default()
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank both read as `None`.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional_env(key)
        .map(|v| v.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("Environment variable '{key}' has an invalid value"))
}

/// Parses `"min-max"` milliseconds (or a single value) into a delay range.
pub fn parse_delay_range(raw: &str) -> Result<(Duration, Duration)> {
    let (min, max) = match raw.split_once('-') {
        Some((min, max)) => (min.trim(), max.trim()),
        None => (raw.trim(), raw.trim()),
    };
    let min: u64 = min.parse().with_context(|| format!("invalid delay '{min}'"))?;
    let max: u64 = max.parse().with_context(|| format!("invalid delay '{max}'"))?;
    if min > max {
        bail!("delay range {min}-{max} is reversed");
    }
    Ok((Duration::from_millis(min), Duration::from_millis(max)))
}
