//! Route handlers. Each one extracts ids from the path or body, delegates to
//! [`SurveyService`](dsa_core::SurveyService), and maps the outcome to a status and body.

mod answers;
mod survey;

pub(crate) use answers::{create_session, generate, get_answers, post_answer};
pub(crate) use survey::{categories, general_questions, health, needs_general, questions, status};

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dsa_core::CoreError;

/// Handler error; rendered as a plain-text body.
#[derive(Debug)]
pub(crate) struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        Self(e)
    }
}

/// Malformed or incomplete JSON bodies are validation failures, not 422s.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CoreError::invalid(rejection.body_text()))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            CoreError::NotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Invalid(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(target: "dsa::gateway", error = %self.0, "request failed");
        } else {
            tracing::warn!(target: "dsa::gateway", status = status.as_u16(), reason = %self.0, "request rejected");
        }
        (status, self.0.to_string()).into_response()
    }
}
