use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::dto::ErrorDto;
use crate::provider::ProviderError;

/// Everything a transcription handler can fail with. Converted to a status
/// code and JSON body only at the actix boundary.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("API key not configured")]
    ApiKeyNotConfigured,

    #[error("No audio file provided")]
    MissingAudio,

    #[error("Empty filename")]
    EmptyFilename,

    #[error("Failed to read audio data")]
    UnreadableAudio(#[source] actix_web::Error),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl RelayError {
    fn context(&self) -> Option<&'static str> {
        match self {
            RelayError::Provider(_) => Some("Failed to transcribe audio"),
            _ => None,
        }
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingAudio | RelayError::EmptyFilename | RelayError::UnreadableAudio(_) => {
                StatusCode::BAD_REQUEST
            }
            RelayError::ApiKeyNotConfigured | RelayError::Provider(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorDto {
            success: false,
            error: self.to_string(),
            message: self.context(),
        })
    }
}
