use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::models::Subject,
    common::{app_state::AppState, error::ServerError},
    generation::{models::GenerateQuizRequest, parser::parse_quiz_draft, prompts::build_prompts},
    quiz::{
        db,
        models::{CreateQuizRequest, Quiz, QuizSummary},
    },
};

pub fn quiz_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_quizzes).post(create_quiz))
        .route("/generate", post(generate_quiz))
        .route("/{quiz_id}", get(get_quiz).delete(delete_quiz))
        .with_state(state)
}

async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    payload: Result<Json<CreateQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Json(request) = payload?;
    let (draft, time_limit) = request.into_draft();
    draft.validate()?;

    let time_limit = match time_limit {
        None => 0,
        Some(minutes) => u32::try_from(minutes)
            .map_err(|_| ServerError::BadRequest("Time limit cannot be negative".into()))?,
    };

    let quiz = Quiz {
        id: Uuid::new_v4(),
        user_id: subject.user_id,
        title: draft.title.trim().to_string(),
        questions: draft.into_questions(),
        time_limit,
        created_at: Utc::now(),
    };

    db::create_quiz(state.get_pool(), &quiz).await?;
    info!("Created quiz {} with {} questions", quiz.id, quiz.question_count());

    Ok((StatusCode::CREATED, Json(quiz)))
}

async fn list_quizzes(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
) -> Result<impl IntoResponse, ServerError> {
    let quizzes = db::list_quizzes(state.get_pool(), &subject.user_id).await?;
    let summaries: Vec<QuizSummary> = quizzes.iter().map(QuizSummary::from).collect();

    Ok((StatusCode::OK, Json(summaries)))
}

async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    let quiz = db::get_quiz_by_id(state.get_pool(), &subject.user_id, &quiz_id).await?;
    Ok((StatusCode::OK, Json(quiz)))
}

async fn delete_quiz(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServerError> {
    db::delete_quiz(state.get_pool(), &subject.user_id, &quiz_id).await?;
    Ok(StatusCode::OK)
}

/// Generates a quiz draft for review. Nothing is persisted here, the author
/// saves the reviewed draft through `create_quiz`.
async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateQuizRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let Json(request) = payload?;
    let Some(prompts) = build_prompts(&request) else {
        return Err(ServerError::BadRequest(
            "Please provide a topic or paste some text.".into(),
        ));
    };

    let generator = state.get_generator()?;
    let text = generator.generate(&prompts.system, &prompts.user).await?;

    let draft = parse_quiz_draft(&text).map_err(|e| {
        warn!("Generated quiz could not be decoded: {}", e);
        ServerError::from(e)
    })?;

    Ok((StatusCode::OK, Json(draft)))
}
