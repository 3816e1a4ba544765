use std::sync::Arc;

use actix_cors::Cors;
use actix_multipart::{Field, Multipart};
use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer, Responder, get, middleware::Logger, post, web,
};
use actix_web::http::header::ContentDisposition;
use futures_util::TryStreamExt;
use log::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::dto::{
    EndpointsDto, HealthDto, HomeDto, SERVICE_NAME, SERVICE_VERSION, TimestampedTranscriptionDto,
    TranscriptionDto,
};
use crate::error::RelayError;
use crate::provider::groq::GroqProvider;
use crate::provider::{
    AudioUpload, ProviderError, ResponseFormat, TranscriptionProvider, TranscriptionRequest,
};

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_MODEL: &str = "whisper-large-v3";

const ROUTES: &[&str] = &["/", "/health", "/transcribe", "/transcribe-with-timestamps"];

pub struct AppState {
    pub config: RelayConfig,
    pub provider: Arc<dyn TranscriptionProvider>,
}

/// Multipart fields of an upload, before validation.
#[derive(Default)]
struct UploadForm {
    audio: Option<AudioUpload>,
    language: Option<String>,
    model: Option<String>,
}

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(HomeDto {
        message: SERVICE_NAME,
        status: "running",
        endpoints: EndpointsDto {
            health: "/health",
            transcribe: "/transcribe",
            transcribe_with_timestamps: "/transcribe-with-timestamps",
        },
    })
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    debug!("Health check endpoint called");
    HttpResponse::Ok().json(HealthDto {
        status: "healthy",
        service: SERVICE_NAME,
        version: SERVICE_VERSION,
    })
}

#[post("/transcribe")]
pub async fn transcribe(
    data: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, RelayError> {
    let request = prepare_request(&data.config, payload, ResponseFormat::Json).await?;
    let language = request.language.clone();
    let model = request.model.clone();

    let output = data
        .provider
        .transcribe(request)
        .await
        .inspect_err(|e| log_provider_failure(data.provider.name(), e))?;

    info!("Transcription successful: {} characters", output.text.len());

    Ok(HttpResponse::Ok().json(TranscriptionDto {
        success: true,
        text: output.text,
        language,
        model,
    }))
}

#[post("/transcribe-with-timestamps")]
pub async fn transcribe_with_timestamps(
    data: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, RelayError> {
    let request = prepare_request(&data.config, payload, ResponseFormat::VerboseJson).await?;

    let output = data
        .provider
        .transcribe(request)
        .await
        .inspect_err(|e| log_provider_failure(data.provider.name(), e))?;

    info!(
        "Timestamped transcription successful: {} characters, duration {:?}",
        output.text.len(),
        output.duration
    );

    Ok(HttpResponse::Ok().json(TimestampedTranscriptionDto {
        success: true,
        text: output.text,
        language: output.language,
        duration: output.duration,
        segments: output.segments,
    }))
}

/// Checks the credential, then reads and validates the upload. The body is
/// not touched when the credential is unusable.
async fn prepare_request(
    config: &RelayConfig,
    payload: Multipart,
    format: ResponseFormat,
) -> Result<TranscriptionRequest, RelayError> {
    if !config.has_usable_api_key() {
        error!("Rejecting transcription request: API key not configured");
        return Err(RelayError::ApiKeyNotConfigured);
    }

    let form = read_upload(payload).await?;

    let audio = match form.audio {
        Some(audio) => audio,
        None => {
            warn!("No audio file provided in transcription request");
            return Err(RelayError::MissingAudio);
        }
    };
    if audio.filename.is_empty() {
        warn!("Audio file provided with an empty filename");
        return Err(RelayError::EmptyFilename);
    }

    let language = form.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let model = form.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

    info!(
        "Transcription request: file={}, {} bytes, language={}, model={}, format={}",
        audio.filename,
        audio.bytes.len(),
        language,
        model,
        format.as_str()
    );

    Ok(TranscriptionRequest {
        audio,
        model,
        language,
        format,
    })
}

async fn read_upload(mut payload: Multipart) -> Result<UploadForm, RelayError> {
    let mut form = UploadForm::default();

    while let Some(field) = payload.try_next().await.unwrap_or_else(|e| {
        warn!("Stopped reading multipart payload: {e}");
        None
    }) {
        match field.name() {
            Some("audio") if form.audio.is_none() => {
                // A part without a filename is a plain form value, not a file.
                let filename = match field.content_disposition().and_then(upload_filename) {
                    Some(name) => name,
                    None => {
                        debug!("Ignoring `audio` field without a filename");
                        continue;
                    }
                };
                let bytes = read_field_data(field).await.map_err(|e| {
                    error!("Failed to read audio data: {e}");
                    RelayError::UnreadableAudio(e)
                })?;
                debug!("Audio data received: {} bytes", bytes.len());
                form.audio = Some(AudioUpload { filename, bytes });
            }
            Some("language") => {
                form.language = read_text_field(field).await;
                debug!("Language set to: {:?}", form.language);
            }
            Some("model") => {
                form.model = read_text_field(field).await;
                debug!("Model set to: {:?}", form.model);
            }
            _ => continue,
        }
    }

    Ok(form)
}

/// Plain `filename` first, then the RFC 5987 `filename*` form.
fn upload_filename(cd: &ContentDisposition) -> Option<String> {
    if let Some(name) = cd.get_filename() {
        return Some(name.to_string());
    }
    cd.get_filename_ext()
        .map(|ext| String::from_utf8_lossy(&ext.value).into_owned())
}

pub(crate) async fn read_field_data(mut field: Field) -> Result<Vec<u8>, actix_web::Error> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        data.extend_from_slice(&chunk);
    }
    debug!("Read field data: {} bytes", data.len());
    Ok(data)
}

/// Blank or undecodable values count as absent so the defaults apply.
/// Anything else is passed on as sent.
async fn read_text_field(field: Field) -> Option<String> {
    let data = read_field_data(field).await.ok()?;
    let text = String::from_utf8(data).ok()?;
    if text.trim().is_empty() { None } else { Some(text) }
}

fn log_provider_failure(provider: &str, err: &ProviderError) {
    error!("Transcription via {provider} failed: {err}");
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        error!("  caused by: {cause}");
        source = cause.source();
    }
    debug!("Provider error detail: {err:?}");
}

/// Fallback for anything no route matched: 405 for a known path hit with
/// the wrong method, 404 otherwise.
async fn unmatched(req: HttpRequest) -> Result<HttpResponse, RelayError> {
    if ROUTES.contains(&req.path()) {
        debug!("{} not allowed on {}", req.method(), req.path());
        Err(RelayError::MethodNotAllowed)
    } else {
        debug!("No route for {} {}", req.method(), req.path());
        Err(RelayError::NotFound)
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(health_check)
        .service(transcribe)
        .service(transcribe_with_timestamps)
        .default_service(web::to(unmatched));
}

pub async fn run_server(host: String, port: u16, config: RelayConfig) -> std::io::Result<()> {
    info!("Starting speech-to-text relay");
    info!("Provider endpoint: {}", config.api_base_url);
    info!("API key: configured");

    let provider: Arc<dyn TranscriptionProvider> = Arc::new(GroqProvider::new(&config));
    let app_state = web::Data::new(AppState { config, provider });

    info!("Starting HTTP server on {host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
