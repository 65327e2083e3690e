use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_MODEL};

/// Runtime configuration loaded from environment variables (and `.env` if present).
/// Everything here has a default; the API key and run inputs come from the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_model: String,
    pub gemini_api_url: String,
    pub llm_timeout_secs: u64,
    pub headless: bool,
    pub pacing: Pacing,
    /// Raw `RUST_LOG` filter directive, if set.
    pub rust_log: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let pacing = Pacing {
            field_delay: Duration::from_millis(parse_env("FIELD_DELAY_MS", 500)?),
            application_gap: Duration::from_secs(parse_env("APPLICATION_DELAY_SECS", 5)?),
            confirmation_timeout: Duration::from_secs(parse_env("CONFIRMATION_TIMEOUT_SECS", 10)?),
            ..Pacing::default()
        };

        Ok(Config {
            gemini_model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            gemini_api_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            headless: parse_env("HEADLESS", true)?,
            pacing,
            rust_log: std::env::var("RUST_LOG").ok(),
        })
    }
}

/// Every sleep and bounded wait the bot performs against third-party sites.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacing {
    /// Wait after loading a search results page.
    pub page_load: Duration,
    /// Wait after each scroll-to-bottom on boards that lazy-load cards.
    pub scroll_interval: Duration,
    /// Wait after loading a posting's detail page.
    pub detail_settle: Duration,
    /// Wait after filling each form field.
    pub field_delay: Duration,
    /// Wait between two application attempts.
    pub application_gap: Duration,
    /// Upper bound on waiting for a confirmation message after submitting.
    pub confirmation_timeout: Duration,
    pub confirmation_poll: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(3),
            scroll_interval: Duration::from_secs(2),
            detail_settle: Duration::from_secs(2),
            field_delay: Duration::from_millis(500),
            application_gap: Duration::from_secs(5),
            confirmation_timeout: Duration::from_secs(10),
            confirmation_poll: Duration::from_millis(250),
        }
    }
}

impl Pacing {
    /// No waiting at all. Used by tests driving in-memory pages.
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            page_load: Duration::ZERO,
            scroll_interval: Duration::ZERO,
            detail_settle: Duration::ZERO,
            field_delay: Duration::ZERO,
            application_gap: Duration::ZERO,
            confirmation_timeout: Duration::ZERO,
            confirmation_poll: Duration::ZERO,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}
