use std::sync::Arc;

use axum::{
    Json, Router, body::Bytes, extract::State, http::StatusCode, response::IntoResponse,
    routing::post,
};
use tracing::{info, warn};

use crate::{
    common::{app_state::AppState, error::ServerError},
    generation::models::{RelayRequest, RelayResponse},
};

pub const RELAY_PATH: &str = "/api/generate-quiz";

pub fn relay_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(RELAY_PATH, post(relay_generation).fallback(method_not_allowed))
        .with_state(state)
}

async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

/// Forwards the prompt pair upstream once and returns the raw text. The body
/// is only interpreted after the credential check.
async fn relay_generation(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    let generator = state.get_generator()?;

    let request: RelayRequest = serde_json::from_slice(&body).unwrap_or_default();
    let Some((system_prompt, user_prompt)) = request.prompts() else {
        warn!("Relay request is missing prompts");
        return Err(ServerError::MissingPrompts);
    };

    let text = generator.generate(system_prompt, user_prompt).await?;
    info!("Relay returned {} characters", text.len());

    Ok((StatusCode::OK, Json(RelayResponse { text })))
}
