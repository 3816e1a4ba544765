use async_trait::async_trait;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::{ProviderError, ProviderTranscription, TranscriptionProvider, TranscriptionRequest};
use crate::config::RelayConfig;

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for Groq's OpenAI-compatible `/audio/transcriptions` endpoint.
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GroqProvider {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            endpoint: format!("{}/audio/transcriptions", config.api_base_url),
        }
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl TranscriptionProvider for GroqProvider {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<ProviderTranscription, ProviderError> {
        let TranscriptionRequest {
            audio,
            model,
            language,
            format,
        } = request;

        debug!(
            "Uploading {} ({} bytes) to {}",
            audio.filename,
            audio.bytes.len(),
            self.endpoint
        );

        let form = Form::new()
            .part("file", Part::bytes(audio.bytes).file_name(audio.filename))
            .text("model", model)
            .text("language", language)
            .text("response_format", format.as_str());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Provider returned {status}: {body}");
            let mut message = error_message(&body);
            if message.is_empty() {
                message = format!("Provider returned {status}");
            }
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    fn name(&self) -> &str {
        "groq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{AudioUpload, ResponseFormat};
    use crate::server::read_field_data;
    use actix_multipart::Multipart;
    use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
    use futures_util::TryStreamExt;
    use std::collections::HashMap;

    /// Stands in for the provider: checks the bearer token and echoes the
    /// multipart fields it received back inside `text`.
    async fn fake_transcriptions(req: HttpRequest, mut payload: Multipart) -> HttpResponse {
        let authorized = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer gsk_test");
        if !authorized {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": { "message": "Invalid API Key", "type": "invalid_request_error" }
            }));
        }

        let mut fields = HashMap::new();
        while let Some(field) = payload.try_next().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);
            let data = read_field_data(field).await.unwrap();
            let value = match filename {
                Some(filename) => format!("{filename}:{}", data.len()),
                None => String::from_utf8(data).unwrap(),
            };
            fields.insert(name, value);
        }

        let echoed = format!(
            "{} {} {} {}",
            fields["file"], fields["model"], fields["language"], fields["response_format"]
        );
        if fields["response_format"] == "verbose_json" {
            HttpResponse::Ok().json(serde_json::json!({
                "text": echoed,
                "language": "english",
                "duration": 2.5,
                "segments": [{ "id": 0, "start": 0.0, "end": 2.5, "text": echoed }]
            }))
        } else {
            HttpResponse::Ok().json(serde_json::json!({ "text": echoed }))
        }
    }

    async fn start_fake_provider() -> (String, actix_web::dev::ServerHandle) {
        let server = HttpServer::new(|| {
            App::new().route("/v1/audio/transcriptions", web::post().to(fake_transcriptions))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        (format!("http://{addr}/v1"), handle)
    }

    fn request(format: ResponseFormat) -> TranscriptionRequest {
        TranscriptionRequest {
            audio: AudioUpload {
                filename: "clip.wav".to_string(),
                bytes: vec![1, 2, 3, 4],
            },
            model: "whisper-large-v3".to_string(),
            language: "en".to_string(),
            format,
        }
    }

    fn provider(api_base_url: &str, api_key: &str) -> GroqProvider {
        GroqProvider::new(&RelayConfig {
            api_key: api_key.to_string(),
            api_base_url: api_base_url.to_string(),
        })
    }

    #[actix_web::test]
    async fn sends_multipart_fields_and_decodes_plain_reply() {
        let (base_url, handle) = start_fake_provider().await;

        let result = provider(&base_url, "gsk_test")
            .transcribe(request(ResponseFormat::Json))
            .await
            .unwrap();

        assert_eq!(result.text, "clip.wav:4 whisper-large-v3 en json");
        assert_eq!(result.language, None);
        assert_eq!(result.segments, None);
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn verbose_reply_keeps_segments_untouched() {
        let (base_url, handle) = start_fake_provider().await;

        let result = provider(&base_url, "gsk_test")
            .transcribe(request(ResponseFormat::VerboseJson))
            .await
            .unwrap();

        assert_eq!(result.language.as_deref(), Some("english"));
        assert_eq!(result.duration, Some(2.5));
        let segments = result.segments.unwrap();
        assert_eq!(segments[0]["end"], 2.5);
        assert_eq!(segments[0]["text"], result.text);
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn rejected_key_surfaces_provider_message() {
        let (base_url, handle) = start_fake_provider().await;

        let err = provider(&base_url, "gsk_wrong")
            .transcribe(request(ResponseFormat::Json))
            .await
            .unwrap_err();

        match &err {
            ProviderError::Api { status, message } => {
                assert_eq!(*status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "Invalid API Key");
        handle.stop(true).await;
    }

    #[actix_web::test]
    async fn unreachable_provider_is_a_network_error() {
        let err = provider("http://127.0.0.1:9", "gsk_test")
            .transcribe(request(ResponseFormat::Json))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(
            error_message(r#"{"error":{"message":"Rate limit reached"}}"#),
            "Rate limit reached"
        );
        assert_eq!(error_message("upstream timeout\n"), "upstream timeout");
    }
}
