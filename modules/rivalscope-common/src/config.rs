use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
///
/// Every provider key is optional at load time. A missing Anthropic key is
/// reported per request as a configuration error, since nothing can run
/// without image understanding; the other keys only narrow which adapters
/// and strategies get wired in.
#[derive(Debug, Clone)]
pub struct Config {
    // AI providers
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub openai_api_key: Option<String>,

    // Scraping
    pub apify_api_key: Option<String>,
    pub serper_api_key: Option<String>,
    pub fixtures_path: Option<String>,

    // Timeouts
    pub adapter_timeout: Duration,
    pub extraction_timeout: Duration,
    pub generation_timeout: Duration,
    pub request_deadline: Duration,

    // Web server
    pub api_host: String,
    pub api_port: u16,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_MODEL.to_string()),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            apify_api_key: optional_env("APIFY_API_KEY"),
            serper_api_key: optional_env("SERPER_API_KEY"),
            fixtures_path: optional_env("FIXTURES_PATH"),
            adapter_timeout: secs_env("ADAPTER_TIMEOUT_SECS", 45)?,
            extraction_timeout: secs_env("EXTRACTION_TIMEOUT_SECS", 60)?,
            generation_timeout: secs_env("GENERATION_TIMEOUT_SECS", 30)?,
            request_deadline: secs_env("REQUEST_DEADLINE_SECS", 120)?,
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("API_PORT must be a number")?,
            max_upload_bytes: match env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v.parse().context("MAX_UPLOAD_BYTES must be a number")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }

    /// Log which keys are configured without leaking them.
    pub fn log_redacted(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  ANTHROPIC_API_KEY: {}", preview(&self.anthropic_api_key));
        tracing::info!("  ANTHROPIC_MODEL: {}", self.anthropic_model);
        tracing::info!("  OPENAI_API_KEY: {}", preview(&self.openai_api_key));
        tracing::info!("  APIFY_API_KEY: {}", preview(&self.apify_api_key));
        tracing::info!("  SERPER_API_KEY: {}", preview(&self.serper_api_key));
        tracing::info!("  FIXTURES_PATH: {}", preview(&self.fixtures_path));
        tracing::info!(
            adapter_secs = self.adapter_timeout.as_secs(),
            extraction_secs = self.extraction_timeout.as_secs(),
            generation_secs = self.generation_timeout.as_secs(),
            deadline_secs = self.request_deadline.as_secs(),
            "  Timeouts"
        );
    }
}

/// First five characters and the length; safe for any UTF-8 value.
fn preview(val: &Option<String>) -> String {
    match val {
        Some(v) if !v.is_empty() => {
            let head: String = v.chars().take(5).collect();
            format!("{head}...({} chars)", v.chars().count())
        }
        _ => "<not set>".to_string(),
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn secs_env(key: &str, default: u64) -> Result<Duration> {
    match env::var(key) {
        Ok(v) => {
            let secs: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a whole number of seconds"))?;
            Ok(Duration::from_secs(secs))
        }
        Err(_) => Ok(Duration::from_secs(default)),
    }
}
