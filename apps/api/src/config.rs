use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_BASE_URL;

pub const DEFAULT_PARSE_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_REWRITE_MODEL: &str = "gemini-3-flash-preview";

/// Application configuration loaded from environment variables.
/// Only malformed values fail startup; a missing API key leaves the service running
/// with AI operations refused.
#[derive(Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub parse_model: String,
    pub analysis_model: String,
    pub rewrite_model: String,
    pub analysis_thinking_budget: u32,
    pub llm_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub retain_analysis_on_failure: bool,
    /// Sessions not looked up for this long are dropped.
    pub session_ttl_secs: u64,
    pub session_sweep_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            gemini_api_key: var("GEMINI_API_KEY").or_else(|| var("API_KEY")),
            gemini_base_url: or_default("GEMINI_BASE_URL", DEFAULT_BASE_URL),
            parse_model: or_default("PARSE_MODEL", DEFAULT_PARSE_MODEL),
            analysis_model: or_default("ANALYSIS_MODEL", DEFAULT_ANALYSIS_MODEL),
            rewrite_model: or_default("REWRITE_MODEL", DEFAULT_REWRITE_MODEL),
            analysis_thinking_budget: parse_or(&var, "ANALYSIS_THINKING_BUDGET", 1024)?,
            llm_timeout_secs: parse_or(&var, "LLM_TIMEOUT_SECS", 120)?,
            max_upload_bytes: parse_or(&var, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            retain_analysis_on_failure: parse_or(&var, "RETAIN_ANALYSIS_ON_FAILURE", false)?,
            session_ttl_secs: parse_or(&var, "SESSION_TTL_SECS", 3600)?,
            session_sweep_secs: parse_or(&var, "SESSION_SWEEP_SECS", 60)?,
            port: parse_or(&var, "PORT", 8080)?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.gemini_api_key.is_some()
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Never zero; `tokio::time::interval` rejects a zero period.
    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_secs.max(1))
    }
}

fn parse_or<T>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        None => Ok(default),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("gemini_base_url", &self.gemini_base_url)
            .field("parse_model", &self.parse_model)
            .field("analysis_model", &self.analysis_model)
            .field("rewrite_model", &self.rewrite_model)
            .field("analysis_thinking_budget", &self.analysis_thinking_budget)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("retain_analysis_on_failure", &self.retain_analysis_on_failure)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("session_sweep_secs", &self.session_sweep_secs)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}
