use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use sqlx::{Pool, Postgres};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    attempt,
    auth::models::Subject,
    common::{app_state::AppState, error::ServerError},
    quiz,
    session::{
        machine::QuizSession,
        models::{QuizResult, SelectAnswerRequest},
        registry::LiveSession,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub quiz_id: Uuid,
}

pub fn session_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(start_session))
        .route("/{session_id}", get(get_session).delete(abandon_session))
        .route("/{session_id}/answer", put(select_answer))
        .route("/{session_id}/advance", post(advance))
        .route("/{session_id}/finish", post(finish_session))
        .with_state(state)
}

async fn start_session(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    payload: Result<Json<StartSessionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Json(request) = payload?;
    let quiz = quiz::db::get_quiz_by_id(state.get_pool(), &subject.user_id, &request.quiz_id).await?;
    let session = QuizSession::start(&quiz, state.get_default_answer())?;

    let pool = state.get_pool().clone();
    let user_id = subject.user_id.clone();
    let quiz_id = quiz.id;
    let title = quiz.title.clone();
    let on_expiry = move |result: QuizResult| {
        tokio::spawn(async move {
            record_attempt(&pool, &user_id, quiz_id, &title, &result).await;
        });
    };

    let live = state
        .get_sessions()
        .insert(LiveSession::begin(subject.user_id, session, on_expiry));
    info!("Started session {} for quiz {}", live.id(), quiz_id);

    Ok((StatusCode::CREATED, Json(live.view().await)))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let live = find_session(&state, &session_id, &subject)?;
    Ok((StatusCode::OK, Json(live.view().await)))
}

async fn select_answer(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Path(session_id): Path<Uuid>,
    payload: Result<Json<SelectAnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Json(request) = payload?;
    let live = find_session(&state, &session_id, &subject)?;
    let view = live.select_answer(request.option_index).await?;
    Ok((StatusCode::OK, Json(view)))
}

async fn advance(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let live = find_session(&state, &session_id, &subject)?;
    let view = live.advance().await?;
    Ok((StatusCode::OK, Json(view)))
}

async fn finish_session(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let live = find_session(&state, &session_id, &subject)?;
    let (finished, view) = live.finish().await;

    if let Some(result) = finished {
        record_attempt(
            state.get_pool(),
            &subject.user_id,
            view.quiz_id,
            &view.title,
            &result,
        )
        .await;
    }

    Ok((StatusCode::OK, Json(view)))
}

async fn abandon_session(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    state
        .get_sessions()
        .remove(&session_id, &subject.user_id)
        .ok_or_else(|| session_not_found(&session_id))?;

    info!("Abandoned session {}", session_id);
    Ok(StatusCode::OK)
}

fn find_session(
    state: &AppState,
    session_id: &Uuid,
    subject: &Subject,
) -> Result<Arc<LiveSession>, ServerError> {
    state
        .get_sessions()
        .get(session_id, &subject.user_id)
        .ok_or_else(|| session_not_found(session_id))
}

fn session_not_found(session_id: &Uuid) -> ServerError {
    ServerError::NotFound(format!("Session with id {} does not exist", session_id))
}

/// The result is already shown to the user, a failed write only loses history.
async fn record_attempt(
    pool: &Pool<Postgres>,
    user_id: &str,
    quiz_id: Uuid,
    title: &str,
    result: &QuizResult,
) {
    match attempt::db::create_attempt(pool, user_id, quiz_id, title, result).await {
        Ok(id) => info!(
            "Recorded attempt {} with score {}/{}",
            id, result.score, result.total_questions
        ),
        Err(e) => error!("Failed to record attempt for quiz {}: {}", quiz_id, e),
    }
}
