use super::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

/// GET /api/v1/health – liveness check for scripts.
pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/v1/status – app identity and store size.
pub(crate) async fn status(State(state): State<AppState>) -> Json<Value> {
    let (users, sessions) = state.survey.store().actor_counts();
    Json(json!({
        "appName": state.config.app_name,
        "port": state.config.port,
        "categories": state.survey.bank().len(),
        "users": users,
        "sessions": sessions,
    }))
}

/// GET /categories
pub(crate) async fn categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.survey.bank().list_categories())
}

/// GET /questions/:category
pub(crate) async fn questions(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let questions = state.survey.bank().get_questions(&category)?;
    Ok(Json(json!({ "category": category, "questions": questions })))
}

/// GET /general-questions
pub(crate) async fn general_questions(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "questions": state.survey.policy().general_questions() }))
}

/// GET /needs-general/:category
pub(crate) async fn needs_general(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Json<Value> {
    let needs_general = state.survey.needs_general(&category);
    Json(json!({ "category": category, "needsGeneral": needs_general }))
}
