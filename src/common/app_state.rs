use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use sqlx::{Pool, Postgres};
use tracing::{info, warn};

use crate::{
    common::error::ServerError,
    config::config::{AppConfig, AuthConfig},
    generation::client::GenerationClient,
    session::{models::DefaultAnswer, registry::SessionRegistry},
};

pub struct AppState {
    pool: Pool<Postgres>,
    jwks: Jwks,
    generator: Option<GenerationClient>,
    sessions: SessionRegistry,
    auth: AuthConfig,
    default_answer: DefaultAnswer,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize, Clone)]
pub struct Jwk {
    pub kid: String,
    pub n: String,
    pub e: String,
    pub kty: String,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(rename(deserialize = "use"), default)]
    pub use_: Option<String>,
}

impl AppState {
    pub async fn from_config(config: &AppConfig) -> Result<Arc<Self>, ServerError> {
        let pool = Pool::<Postgres>::connect(&config.database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Database migrations are up to date");

        let client = Client::new();
        let jwks_url = format!("{}.well-known/jwks.json", config.auth.issuer);
        let response = client.get(jwks_url).send().await?;
        let jwks = response.json::<Jwks>().await?;

        Self::build(config, pool, jwks)
    }

    pub fn build(
        config: &AppConfig,
        pool: Pool<Postgres>,
        jwks: Jwks,
    ) -> Result<Arc<Self>, ServerError> {
        let generator = GenerationClient::from_config(&config.generation)?;
        if generator.is_none() {
            warn!("No generation api key configured, generation requests will be rejected");
        }

        let state = Arc::new(Self {
            pool,
            jwks,
            generator,
            sessions: SessionRegistry::new(),
            auth: config.auth.clone(),
            default_answer: config.session.default_answer,
        });

        Ok(state)
    }

    pub fn get_pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn get_jwks(&self) -> &Jwks {
        &self.jwks
    }

    pub fn get_generator(&self) -> Result<&GenerationClient, ServerError> {
        self.generator.as_ref().ok_or(ServerError::MissingApiKey)
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn get_sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn get_auth_config(&self) -> &AuthConfig {
        &self.auth
    }

    pub fn get_default_answer(&self) -> DefaultAnswer {
        self.default_answer
    }
}
