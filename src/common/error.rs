use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    generation::{client_error::GenerationError, parser::QuizFormatError},
    quiz::models::QuizValidationError,
    session::machine::SessionError,
};

/// Body of every error response. `detail` is left out when empty.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Missing required prompts")]
    MissingPrompts,

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("AI returned an invalid quiz format")]
    InvalidQuizFormat(#[from] QuizFormatError),

    #[error("Invalid quiz: {0}")]
    Validation(#[from] QuizValidationError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Jwt verification failed: {0}")]
    JwtVerification(String),

    #[error("Api error: {0} - {1}")]
    Api(StatusCode, String),

    #[error("Sqlx failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    fn parts(&self) -> (StatusCode, String, Option<String>) {
        match self {
            ServerError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, self.to_string(), None),
            ServerError::MissingApiKey => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), None),
            ServerError::MissingPrompts => (StatusCode::BAD_REQUEST, self.to_string(), None),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ServerError::InvalidBody(e) => (
                StatusCode::BAD_REQUEST,
                "Invalid request body".into(),
                Some(e.body_text()),
            ),
            ServerError::Generation(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.public_message(), None)
            }
            ServerError::InvalidQuizFormat(e) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string(), Some(e.to_string()))
            }
            ServerError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string(), None),
            ServerError::Session(e) => {
                let status = match e {
                    SessionError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
                    SessionError::EmptyQuiz => StatusCode::UNPROCESSABLE_ENTITY,
                    SessionError::Finished => StatusCode::CONFLICT,
                };
                (status, e.to_string(), None)
            }
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            ServerError::JwtVerification(_) => {
                (StatusCode::UNAUTHORIZED, "Invalid auth token".into(), None)
            }
            ServerError::Api(status, msg) => (*status, msg.clone(), None),
            ServerError::Sqlx(_)
            | ServerError::Migration(_)
            | ServerError::Http(_)
            | ServerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into(),
                None,
            ),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error, detail) = self.parts();

        if status.is_server_error() {
            error!("{}", self);
        }

        (status, Json(ErrorBody { error, detail })).into_response()
    }
}
