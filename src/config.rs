//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present. Every
//! key is optional; CLI flags override whatever is found here. Each section
//! loads on its own so a command only validates the keys it reads.

use std::env;
use thiserror::Error;

use crate::chunker::DEFAULT_MAX_CHUNK_SIZE;
use crate::embedder::{EmbeddingClient, EmbeddingModelInfo};
use crate::questions::{QuestionClient, QuestionError};
use crate::search::DEFAULT_TOP_K;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
}

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub chunker: ChunkerConfig,
    pub embedding: EmbeddingConfig,
    pub questions: QuestionsConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// `None` disables subdivision
    pub max_chunk_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub model: String,
    pub dim: usize,
    pub max_batch: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionsConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub top_k: usize,
}

impl Config {
    /// Build config from process environment variables (call `load_dotenv()` first)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Build every section from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            chunker: ChunkerConfig::from_lookup(&lookup)?,
            embedding: EmbeddingConfig::from_lookup(&lookup)?,
            questions: QuestionsConfig::from_lookup(&lookup)?,
            search: SearchConfig::from_lookup(&lookup)?,
        })
    }
}

impl ChunkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            max_chunk_size: parse_budget(get(lookup, "MDCHUNKER_MAX_CHUNK_SIZE"))?,
        })
    }
}

impl EmbeddingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_model = EmbeddingModelInfo::default();

        Ok(Self {
            endpoint: get(lookup, "EMBEDDING_ENDPOINT")
                .unwrap_or_else(|| "http://localhost:18115".to_string()),
            model: get(lookup, "EMBEDDING_MODEL").unwrap_or(default_model.name),
            dim: parse_or(lookup, "EMBEDDING_DIM", default_model.dim)?,
            max_batch: parse_or(lookup, "EMBEDDING_BATCH", default_model.max_batch)?,
        })
    }

    pub fn model_info(&self) -> EmbeddingModelInfo {
        EmbeddingModelInfo::new(self.model.clone(), self.dim, self.max_batch)
    }

    pub fn client(&self) -> EmbeddingClient {
        EmbeddingClient::with_model(&self.endpoint, self.model_info())
    }
}

impl QuestionsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            endpoint: get(lookup, "QUESTIONS_ENDPOINT")
                .unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
            model: get(lookup, "QUESTIONS_MODEL")
                .unwrap_or_else(|| "llama-3.1-8b-instant".to_string()),
            max_tokens: parse_or(lookup, "QUESTIONS_MAX_TOKENS", 800)?,
            api_key: get(lookup, "GROQ_API_KEY"),
        })
    }

    pub fn client(&self) -> Result<QuestionClient, QuestionError> {
        let client = QuestionClient::new(&self.endpoint, &self.model)?.max_tokens(self.max_tokens);
        Ok(match &self.api_key {
            Some(key) => client.api_key(key),
            None => client,
        })
    }
}

impl SearchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            top_k: parse_or(lookup, "SEARCH_TOP_K", DEFAULT_TOP_K)?,
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Empty values count as unset
fn get<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match get(lookup, key) {
        None => Ok(default),
        Some(v) => parse_value(key, v),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value,
    })
}

/// `0` or `none` disables the budget; unset falls back to the default
fn parse_budget(value: Option<String>) -> Result<Option<usize>, ConfigError> {
    let Some(raw) = value else {
        return Ok(Some(DEFAULT_MAX_CHUNK_SIZE));
    };
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }

    let size: usize = parse_value("MDCHUNKER_MAX_CHUNK_SIZE", raw)?;
    Ok((size > 0).then_some(size))
}
