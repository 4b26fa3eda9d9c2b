use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use crate::errors::AppError;

pub const DEFAULT_PROFILE_ENDPOINT: &str = "https://nubela.co/proxycurl/api/v2/linkedin";
pub const DEFAULT_CACHE_PATH: &str = "json_cache.json";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// One entry of the `OAI_CONFIG_LIST` document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelEntry {
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Resolved settings for the chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub temperature: f32,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub profile_api_key: String,
    pub profile_endpoint: String,
    pub cache_path: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = require(&lookup, "OPENAI_API_KEY")?;
        let profile_api_key = require(&lookup, "PROXYCURL_API")?;
        let config_list = require(&lookup, "OAI_CONFIG_LIST")?;

        let entries = load_config_list(&config_list)
            .map_err(|e| AppError::Configuration(format!("{e:#}")))?;
        let entry = entries.into_iter().next().ok_or_else(|| {
            AppError::Configuration("OAI_CONFIG_LIST contains no model entries".to_string())
        })?;

        let temperature = match lookup("LLM_TEMPERATURE") {
            Some(raw) => raw.parse::<f32>().map_err(|_| {
                AppError::Configuration(format!("LLM_TEMPERATURE must be a number, got '{raw}'"))
            })?,
            None => 0.0,
        };

        Ok(Config {
            llm: LlmSettings {
                model: entry.model,
                api_key: entry.api_key.unwrap_or(openai_api_key),
                base_url: entry
                    .base_url
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                temperature,
            },
            profile_api_key,
            profile_endpoint: lookup("PROXYCURL_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_PROFILE_ENDPOINT.to_string()),
            cache_path: lookup("OUTREACH_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            AppError::Configuration(format!("Required environment variable '{key}' is not set"))
        })
}

/// `OAI_CONFIG_LIST` holds either the JSON list itself or a path to a file containing it.
fn load_config_list(value: &str) -> anyhow::Result<Vec<ModelEntry>> {
    let trimmed = value.trim();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("OAI_CONFIG_LIST is not a valid model list");
    }
    let raw = std::fs::read_to_string(trimmed)
        .with_context(|| format!("Failed to read OAI_CONFIG_LIST file '{trimmed}'"))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("OAI_CONFIG_LIST file '{trimmed}' is not a valid model list"))
}
