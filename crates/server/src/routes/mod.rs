//! Route table.

mod assist;
mod slides;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

/// All endpoints, with the state applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-ppt", post(slides::generate))
        .route("/get-slides/:topic", get(slides::get_slides))
        .route("/check-slides/:topic", get(slides::check_slides))
        .route("/update-slides", post(slides::update_slides))
        .route("/download-ppt/:topic", get(slides::download_ppt))
        .route("/download-pdf/:topic", get(slides::download_pdf))
        .route("/ai-search", post(assist::ai_search))
        .route("/translate", post(assist::translate))
        .route("/medical-chat", post(assist::medical_chat))
        .route("/solve-math", post(assist::solve_math))
        .with_state(state)
}
