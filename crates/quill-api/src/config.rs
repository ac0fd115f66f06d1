use std::collections::HashMap;
use std::env;
use std::fmt;

use thiserror::Error;

use quill_core::slug::service::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, ENV_GENERATION_BASE_URL, ENV_GENERATION_MODEL,
    ENV_GOOGLE_API_KEY, ENV_GOOGLE_GENERATIVE_AI_API_KEY,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub generation: Option<GenerationConfig>,
}

/// Remote slug generation settings; absent when no credential is configured,
/// which silently selects the local strategy.
#[derive(Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("GenerationConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("generation", &self.generation)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = value_or_default(&lookup, "QUILL_API_BIND_ADDR", "127.0.0.1:8080");

        // First present credential variable wins.
        let api_key = optional_trimmed(&lookup, ENV_GOOGLE_API_KEY)
            .or_else(|| optional_trimmed(&lookup, ENV_GOOGLE_GENERATIVE_AI_API_KEY));

        let generation = match api_key {
            Some(api_key) => {
                let base_url = value_or_default(&lookup, ENV_GENERATION_BASE_URL, DEFAULT_BASE_URL);
                let base_url = base_url.trim_end_matches('/').to_string();
                if !is_http_url(&base_url) {
                    return Err(ConfigError::Invalid(format!(
                        "{ENV_GENERATION_BASE_URL} must start with http:// or https://"
                    )));
                }

                let model = value_or_default(&lookup, ENV_GENERATION_MODEL, DEFAULT_MODEL);

                Some(GenerationConfig {
                    base_url,
                    api_key,
                    model,
                })
            }
            None => None,
        };

        Ok(Self {
            bind_addr,
            generation,
        })
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
