pub mod groq;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx reply; `message` is the provider's own wording.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Final text only.
    Json,
    /// Text plus language, duration and segment timings.
    VerboseJson,
}

impl ResponseFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::VerboseJson => "verbose_json",
        }
    }
}

pub struct AudioUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct TranscriptionRequest {
    pub audio: AudioUpload,
    pub model: String,
    pub language: String,
    pub format: ResponseFormat,
}

/// Provider reply. Fields beyond `text` are only filled in verbose mode;
/// `segments` is kept as raw JSON so it can be forwarded untouched.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ProviderTranscription {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub segments: Option<Value>,
}

#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<ProviderTranscription, ProviderError>;

    fn name(&self) -> &str;
}
