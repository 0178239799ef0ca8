use super::ApiError;
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use dsa_core::{ActorIdentity, AnswerSubmission, CoreError, GeneratePayload};
use serde::Deserialize;
use serde_json::{json, Value};

/// Body of POST /answers. Exactly one of `userId` / `sessionId` must be set.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnswerRequest {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    /// Ignored for general answers.
    #[serde(default)]
    category: String,
    question: String,
    answer: String,
    #[serde(default)]
    is_general: bool,
}

/// Body of POST /generate.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    category: String,
}

fn actor_from(user_id: Option<String>, session_id: Option<String>) -> Result<ActorIdentity, ApiError> {
    ActorIdentity::from_parts(user_id, session_id)
        .ok_or_else(|| CoreError::invalid("Exactly one of userId or sessionId is required").into())
}

/// POST /session – issues a new session id.
pub(crate) async fn create_session(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let session_id = state.survey.store().create_session()?;
    Ok(Json(json!({ "sessionId": session_id })))
}

/// POST /answers – records one answer; 200 with an empty body.
pub(crate) async fn post_answer(
    State(state): State<AppState>,
    body: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(req) = body?;
    let actor = actor_from(req.user_id, req.session_id)?;
    let submission = AnswerSubmission {
        category: &req.category,
        question: &req.question,
        answer: &req.answer,
        is_general: req.is_general,
    };
    state.survey.submit_answer(&actor, &submission)?;
    Ok(StatusCode::OK)
}

/// GET /answers/:id/:category – unknown actors read as empty maps.
pub(crate) async fn get_answers(
    State(state): State<AppState>,
    Path((id, category)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let actor = state.survey.store().resolve(&id)?;
    let view = state.survey.answers(&actor, &category)?;
    Ok(Json(json!({
        "category": category,
        "general": view.general,
        "answers": view.answers,
    })))
}

/// POST /generate – 404 until the actor has answers in the category.
pub(crate) async fn generate(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GeneratePayload>, ApiError> {
    let Json(req) = body?;
    let actor = actor_from(req.user_id, req.session_id)?;
    let payload = state.survey.generate(&actor, &req.category)?;
    tracing::info!(
        target: "dsa::gateway",
        actor = payload.id.as_str(),
        category = payload.category.as_str(),
        answers = payload.answers.len(),
        "generate payload assembled"
    );
    Ok(Json(payload))
}
