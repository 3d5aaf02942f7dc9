//! Single-shot assistant endpoints that pass a prompt straight to the model.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use deck_gemini::GenerationRequest;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

const NO_RESULTS: &str = "No relevant information found.";
const NO_ANSWER: &str = "Sorry, I could not come up with an answer.";

const TRANSLATE_INSTRUCTION: &str =
    "You are a translator. Reply with the translated text only, without notes or quotes.";
const MEDICAL_INSTRUCTION: &str = "You are a friendly health information assistant. \
Give general, evidence-based information in plain language. \
You do not diagnose; recommend seeing a medical professional for anything urgent or serious.";
const MATH_INSTRUCTION: &str = "You are a math tutor. Solve the problem step by step, \
then give the final answer on its own last line.";

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TranslateRequest {
    text: Option<String>,
    target_language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatRequest {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MathRequest {
    problem: Option<String>,
}

/// The trimmed field, or a 400 with `message`.
fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

/// Call the model, substituting `empty` when it answers with no text.
async fn ask(state: &AppState, request: GenerationRequest, empty: &str) -> Result<String, ApiError> {
    let text = state
        .generator
        .generate(&request)
        .await
        .map_err(ApiError::from_gateway)?;
    if text.trim().is_empty() {
        Ok(empty.to_string())
    } else {
        Ok(text.trim().to_string())
    }
}

/// `POST /ai-search`
pub(super) async fn ai_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let query = required(request.query, "Query is required")?;

    let response = ask(&state, GenerationRequest::new(query.as_str()), NO_RESULTS).await?;
    Ok(Json(json!({ "query": query, "response": response })))
}

/// `POST /translate`
pub(super) async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let missing = "Text and targetLanguage are required";
    let text = required(request.text, missing)?;
    let language = required(request.target_language, missing)?;

    let prompt = format!("Translate the following text into {}:\n\n{}", language, text);
    let request = GenerationRequest::new(prompt).with_system_instruction(TRANSLATE_INSTRUCTION);
    let translation = ask(&state, request, NO_ANSWER).await?;
    Ok(Json(json!({ "translation": translation })))
}

/// `POST /medical-chat`
pub(super) async fn medical_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let message = required(request.message, "Message is required")?;

    let request = GenerationRequest::new(message).with_system_instruction(MEDICAL_INSTRUCTION);
    let reply = ask(&state, request, NO_ANSWER).await?;
    Ok(Json(json!({ "reply": reply })))
}

/// `POST /solve-math`
pub(super) async fn solve_math(
    State(state): State<AppState>,
    payload: Result<Json<MathRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let problem = required(request.problem, "Problem is required")?;

    let request = GenerationRequest::new(problem).with_system_instruction(MATH_INSTRUCTION);
    let solution = ask(&state, request, NO_ANSWER).await?;
    Ok(Json(json!({ "solution": solution })))
}
