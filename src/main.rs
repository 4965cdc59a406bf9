use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};
use dotenv::dotenv;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::FmtSubscriber;

use crate::{
    attempt::handlers::attempt_routes,
    common::app_state::AppState,
    config::config::CONFIG,
    generation::handlers::relay_routes,
    health::handlers::health_routes,
    mw::{auth_mw::auth_mw, request_mw::request_mw},
    quiz::handlers::quiz_routes,
    session::handlers::session_routes,
};

mod attempt;
mod auth;
mod common;
mod config;
mod generation;
mod health;
mod mw;
mod quiz;
mod session;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize .env
    dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::DEBUG)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global tracing");

    // Initialize state
    let state = AppState::from_config(&CONFIG)
        .await
        .unwrap_or_else(|e| panic!("{}", e));

    state.get_sessions().spawn_cleanup();

    // Initialize webserver
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", CONFIG.server.address, CONFIG.server.port))
            .await?;

    info!("Server listening on address: {}", listener.local_addr()?);
    axum::serve(listener, app_router(state)).await
}

pub fn app_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .nest("/health", health_routes(state.clone()))
        .merge(relay_routes(state.clone()));

    let protected_routes = Router::new()
        .nest("/quizzes", quiz_routes(state.clone()))
        .nest("/sessions", session_routes(state.clone()))
        .nest("/attempts", attempt_routes(state.clone()))
        .layer(from_fn_with_state(state.clone(), auth_mw));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(from_fn(request_mw))
}
