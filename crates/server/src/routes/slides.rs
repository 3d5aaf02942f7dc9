//! Deck endpoints: generate, fetch, check, update and download.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use deck_core::{normalize_slides, ResponseParser, SlideInput, TopicKey};
use deck_gemini::GenerationRequest;
use deck_pdf::{PdfRenderer, PDF_CONTENT_TYPE};
use deck_pptx::{PptxRenderer, PPTX_CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::{assets, AppState};

const MISSING_GENERATE_FIELDS: &str = "Missing required fields: topic and slidesCount";
const MISSING_TOPIC: &str = "Missing required field: topic";
const NO_SLIDES: &str = "No slides to save";
const UNEXPECTED_AI_RESPONSE: &str = "Unexpected AI response. Please try again.";
const UPDATED: &str = "Slides updated successfully!";

const FETCH_FAILED: &str = "Failed to fetch slides";
const SAVE_FAILED: &str = "Failed to save slides";
const UPDATE_FAILED: &str = "Failed to update slides";
const PPT_FAILED: &str = "Failed to generate PowerPoint file.";
const PDF_FAILED: &str = "Failed to generate PDF file.";

/// `slidesCount` as clients send it: a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum SlideCount {
    Number(u64),
    Text(String),
}

impl SlideCount {
    /// The requested count, or `None` for `0` and `""`, which mean "not given".
    fn resolve(&self) -> Result<Option<u32>, ApiError> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(s) if s.trim().is_empty() => return Ok(None),
            Self::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| ApiError::bad_request("slidesCount must be a whole number"))?,
        };
        Ok((n > 0).then(|| u32::try_from(n).unwrap_or(u32::MAX)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateRequest {
    topic: Option<String>,
    slides_count: Option<SlideCount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateRequest {
    topic: Option<String>,
    slides: Option<Vec<SlideInput>>,
    use_images: Option<bool>,
}

fn client_error(err: deck_core::Error) -> ApiError {
    ApiError::from_core(err, "Invalid request")
}

fn key_for(topic: &str) -> Result<TopicKey, ApiError> {
    TopicKey::from_topic(topic).map_err(client_error)
}

/// `POST /generate-ppt`: ask the model for a deck, store it and return it.
pub(super) async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let topic = request.topic.as_deref().map(str::trim).unwrap_or_default();
    let count = match &request.slides_count {
        Some(count) => count.resolve()?,
        None => None,
    };
    let (topic, count) = match count {
        Some(count) if !topic.is_empty() => (topic, count),
        _ => return Err(ApiError::bad_request(MISSING_GENERATE_FIELDS)),
    };

    let key = key_for(topic)?;
    let count = state.config.slide_count.check(count).map_err(client_error)?;

    let prompt = GenerationRequest::new(state.prompts.build(topic, count))
        .with_system_instruction(state.prompts.system_instruction());
    let text = state
        .generator
        .generate(&prompt)
        .await
        .map_err(ApiError::from_gateway)?;

    let parsed = ResponseParser::new().parse(&text).map_err(|e| {
        log::warn!("{} for '{}' ({} bytes of text)", e, topic, text.len());
        ApiError::Internal(UNEXPECTED_AI_RESPONSE.to_string())
    })?;
    let slides = normalize_slides(parsed.into_iter().map(SlideInput::from).collect(), false);

    state
        .store
        .save(&key, &slides)
        .await
        .map_err(|e| ApiError::from_core(e, SAVE_FAILED))?;
    log::info!("Generated {} slides for '{}'", slides.len(), key);

    Ok(Json(json!({ "slides": slides })))
}

/// `GET /get-slides/:topic`
pub(super) async fn get_slides(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let key = key_for(&topic)?;
    let slides = state
        .store
        .load(&key)
        .await
        .map_err(|e| ApiError::from_core(e, FETCH_FAILED))?;
    Ok(Json(json!({ "success": true, "slides": slides })))
}

/// `GET /check-slides/:topic`
pub(super) async fn check_slides(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let key = key_for(&topic)?;
    let exists = state
        .store
        .exists(&key)
        .await
        .map_err(|e| ApiError::from_core(e, FETCH_FAILED))?;
    Ok(Json(json!({ "exists": exists })))
}

/// `POST /update-slides`: replace a deck with client-edited slides.
pub(super) async fn update_slides(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let inputs = match request.slides {
        Some(slides) if !slides.is_empty() => slides,
        _ => return Err(ApiError::bad_request(NO_SLIDES)),
    };
    let topic = request.topic.as_deref().map(str::trim).unwrap_or_default();
    if topic.is_empty() {
        return Err(ApiError::bad_request(MISSING_TOPIC));
    }
    let key = key_for(topic)?;

    let slides = normalize_slides(inputs, request.use_images.unwrap_or(false));
    state
        .store
        .save(&key, &slides)
        .await
        .map_err(|e| ApiError::from_core(e, UPDATE_FAILED))?;
    log::info!("Updated '{}' with {} slides", key, slides.len());

    Ok(Json(json!({ "success": true, "message": UPDATED })))
}

/// `GET /download-ppt/:topic`
pub(super) async fn download_ppt(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Response, ApiError> {
    let key = key_for(&topic)?;
    let slides = state
        .store
        .load(&key)
        .await
        .map_err(|e| ApiError::from_core(e, PPT_FAILED))?;
    let assets = assets::collect(&state.images, state.asset_dir.as_deref(), &slides)
        .await
        .map_err(|e| ApiError::from_core(e, PPT_FAILED))?;

    let renderer = PptxRenderer::new(state.config.layout.clone());
    let title = topic.trim().to_string();
    let bytes =
        render_blocking(move || renderer.render(&title, &slides, &assets), PPT_FAILED).await?;

    attachment(bytes, PPTX_CONTENT_TYPE, &key.file_name("pptx"))
}

/// `GET /download-pdf/:topic`
pub(super) async fn download_pdf(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Response, ApiError> {
    let key = key_for(&topic)?;
    let slides = state
        .store
        .load(&key)
        .await
        .map_err(|e| ApiError::from_core(e, PDF_FAILED))?;

    let renderer = PdfRenderer::new(state.config.layout.clone());
    let title = topic.trim().to_string();
    let bytes = render_blocking(move || renderer.render(&title, &slides), PDF_FAILED).await?;

    attachment(bytes, PDF_CONTENT_TYPE, &key.file_name("pdf"))
}

/// Run a renderer on the blocking pool.
async fn render_blocking<F>(job: F, message: &str) -> Result<Vec<u8>, ApiError>
where
    F: FnOnce() -> deck_core::Result<Vec<u8>> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| {
            log::error!("{}: render task failed: {}", message, e);
            ApiError::Internal(message.to_string())
        })?
        .map_err(|e| ApiError::from_core(e, message))
}

fn attachment(bytes: Vec<u8>, content_type: &'static str, file_name: &str) -> Result<Response, ApiError> {
    let disposition = HeaderValue::from_str(&content_disposition(file_name)).map_err(|e| {
        log::error!("Bad Content-Disposition for '{}': {}", file_name, e);
        ApiError::Internal("Failed to prepare download".into())
    })?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// `attachment` disposition, adding an RFC 5987 name for non-ASCII keys.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() { c } else { '_' })
        .collect();
    if fallback == file_name {
        return format!("attachment; filename=\"{}\"", file_name);
    }
    let encoded: String = file_name
        .bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
                (b as char).to_string()
            } else {
                format!("%{:02X}", b)
            }
        })
        .collect();
    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}
