use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::{
    attempt::{db, models::AttemptQuery},
    auth::models::Subject,
    common::{app_state::AppState, error::ServerError},
};

pub fn attempt_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_attempts))
        .with_state(state)
}

async fn list_attempts(
    State(state): State<Arc<AppState>>,
    Extension(subject): Extension<Subject>,
    Query(query): Query<AttemptQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let attempts = db::list_attempts(state.get_pool(), &subject.user_id, query.quiz_id).await?;
    Ok((StatusCode::OK, Json(attempts)))
}
