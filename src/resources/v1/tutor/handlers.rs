use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::models::{V1AppInfo, V1Health, V1TutorRequest, V1TutorResponse};
use super::prompt::build_prompt;
use crate::errors::ApiError;
use crate::state::AppState;
use crate::tutor_info_with_fields;

pub const APP_DESCRIPTION: &str = "An AI tutor assistant API powered by OpenRouter";

/// Ask a subject tutor a question.
///
/// Requests are spaced by the global rate limiter before the prompt is sent upstream.
pub async fn ask_tutor(
    State(state): State<AppState>,
    payload: Result<Json<V1TutorRequest>, JsonRejection>,
) -> Result<Json<V1TutorResponse>, ApiError> {
    let Json(request) = payload?;

    answer(&state, request).await.map(Json)
}

/// The tutoring pipeline shared by the HTTP handler and the `ask` command.
pub async fn answer(state: &AppState, request: V1TutorRequest) -> Result<V1TutorResponse, ApiError> {
    state.limiter.wait().await;

    tutor_info_with_fields!(
        student_id = request.student_id.as_str(),
        subject = request.subject.as_str();
        "Question from student {} on subject: {}",
        request.student_id,
        request.subject
    );

    let prompt = build_prompt(&request.subject, &request.level, &request.question);
    let answer = state.provider.ask(&prompt, &request.student_id).await?;

    Ok(V1TutorResponse::answering(request, answer))
}

pub async fn health() -> Json<V1Health> {
    Json(V1Health {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn app_info(State(state): State<AppState>) -> Json<V1AppInfo> {
    Json(V1AppInfo {
        title: state.config.app_title.clone(),
        description: APP_DESCRIPTION.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
