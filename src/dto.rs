use serde::Serialize;
use serde_json::Value;

pub const SERVICE_NAME: &str = "Speech-to-Text API";
pub const SERVICE_VERSION: &str = "1.0";

#[derive(Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct HomeDto {
    pub message: &'static str,
    pub status: &'static str,
    pub endpoints: EndpointsDto,
}

#[derive(Serialize)]
pub struct EndpointsDto {
    pub health: &'static str,
    pub transcribe: &'static str,
    pub transcribe_with_timestamps: &'static str,
}

#[derive(Serialize)]
pub struct TranscriptionDto {
    pub success: bool,
    pub text: String,
    pub language: String,
    pub model: String,
}

#[derive(Serialize)]
pub struct TimestampedTranscriptionDto {
    pub success: bool,
    pub text: String,
    pub language: Option<String>,
    pub duration: Option<f64>,
    pub segments: Option<Value>,
}

#[derive(Serialize)]
pub struct ErrorDto {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}
