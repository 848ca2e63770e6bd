use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::common::utils::DEFAULT_EMBEDDING_DIMENSIONS;

pub const DEFAULT_MEETING_BASE_URL: &str = "https://meet.jit.si";

/// Which embedder backs the similarity scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingProvider {
    /// Local feature hashing, no network
    #[default]
    Hashing,
    OpenAi,
}

impl FromStr for EmbeddingProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hashing" => Ok(Self::Hashing),
            "openai" => Ok(Self::OpenAi),
            other => bail!("unknown embedding provider '{}' (expected hashing or openai)", other),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres when set, in-memory otherwise
    pub database_url: Option<String>,
    pub port: u16,
    pub embedding_provider: EmbeddingProvider,
    pub openai_api_key: Option<String>,
    pub embedding_dimensions: usize,
    /// Suggestions kept per need in a ranking pass
    pub match_limit: usize,
    /// Suggestions returned to the member after a check-in
    pub top_matches: usize,
    pub request_timeout: Duration,
    pub meeting_base_url: String,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            port: 8080,
            embedding_provider: EmbeddingProvider::Hashing,
            openai_api_key: None,
            embedding_dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            match_limit: 3,
            top_matches: 3,
            request_timeout: Duration::from_secs(10),
            meeting_base_url: DEFAULT_MEETING_BASE_URL.to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            database_url: var("DATABASE_URL"),
            port: parse_or(var("PORT"), defaults.port).context("PORT must be a valid number")?,
            embedding_provider: parse_or(var("EMBEDDING_PROVIDER"), defaults.embedding_provider)?,
            openai_api_key: var("OPENAI_API_KEY"),
            embedding_dimensions: parse_or(var("EMBEDDING_DIMENSIONS"), defaults.embedding_dimensions)
                .context("EMBEDDING_DIMENSIONS must be a positive number")?,
            match_limit: parse_or(var("MATCH_LIMIT"), defaults.match_limit)
                .context("MATCH_LIMIT must be a positive number")?,
            top_matches: parse_or(var("TOP_MATCHES"), defaults.top_matches)
                .context("TOP_MATCHES must be a positive number")?,
            request_timeout: parse_or(var("REQUEST_TIMEOUT_SECS"), 10u64)
                .map(Duration::from_secs)
                .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            meeting_base_url: var("MEETING_BASE_URL").unwrap_or(defaults.meeting_base_url),
            allowed_origins: var("ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        if config.embedding_provider == EmbeddingProvider::OpenAi && config.openai_api_key.is_none() {
            bail!("OPENAI_API_KEY must be set when EMBEDDING_PROVIDER=openai");
        }
        if config.embedding_dimensions == 0 || config.match_limit == 0 || config.top_matches == 0 {
            bail!("EMBEDDING_DIMENSIONS, MATCH_LIMIT and TOP_MATCHES must be greater than zero");
        }

        Ok(config)
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Into<anyhow::Error>,
{
    match raw {
        Some(value) => value.trim().parse::<T>().map_err(Into::into),
        None => Ok(default),
    }
}
