use anyhow::{Result, anyhow};
use dotenv::dotenv;

pub const API_KEY_VAR: &str = "GROQ_API_KEY";
pub const API_BASE_URL_VAR: &str = "GROQ_API_BASE_URL";
pub const DEFAULT_API_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Value shipped in sample `.env` files; never a real key.
pub const PLACEHOLDER_API_KEY: &str = "your_groq_api_key_here";

/// Provider settings, loaded once at startup and shared read-only.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub api_key: String,
    pub api_base_url: String,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).unwrap_or_default();
        let api_base_url = lookup(API_BASE_URL_VAR)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let config = Self {
            api_key: api_key.trim().to_string(),
            api_base_url,
        };

        if !config.has_usable_api_key() {
            return Err(anyhow!(
                "{} is not set (or still holds the placeholder value)",
                API_KEY_VAR
            ));
        }

        Ok(config)
    }

    pub fn has_usable_api_key(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != PLACEHOLDER_API_KEY
    }
}

#[derive(Debug)]
pub struct ClientConfig {
    pub server_url: String,
    pub audio_file: String,
    pub language: Option<String>,
    pub model: Option<String>,
    pub timestamps: bool,
}

impl ClientConfig {
    pub fn endpoint(&self) -> String {
        let path = if self.timestamps {
            "transcribe-with-timestamps"
        } else {
            "transcribe"
        };
        format!("{}/{}", self.server_url.trim_end_matches('/'), path)
    }
}
