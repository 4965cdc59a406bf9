use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::{config::config::GenerationConfig, generation::client_error::GenerationError};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct UpstreamError {
    error: UpstreamErrorBody,
}

#[derive(Deserialize)]
struct UpstreamErrorBody {
    message: String,
}

/// Client for the external generative-text api. One prompt pair in, one
/// upstream call, raw text out.
#[derive(Clone)]
pub struct GenerationClient {
    api_key: String,
    base_url: String,
    model: String,
    timeout_secs: u64,
    client: Client,
}

impl GenerationClient {
    /// Returns `None` when no api key is configured.
    pub fn from_config(config: &GenerationConfig) -> Result<Option<Self>, GenerationError> {
        let Some(api_key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };

        let client = Self::new(
            api_key,
            &config.base_url,
            &config.model,
            config.timeout_secs,
        )?;

        Ok(Some(client))
    }

    pub fn new(
        api_key: &str,
        base_url: &str,
        model: &str,
        timeout_secs: u64,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(GenerationError::Client)?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout_secs,
            client,
        })
    }

    #[instrument(skip_all, fields(model = %self.model))]
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GenerationError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part {
                        text: system_prompt,
                    },
                    Part { text: user_prompt },
                ],
            }],
        };

        info!("GenerationClient sending prompt pair upstream");
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!("Generation request failed: {} - {}", status, message);
            return Err(GenerationError::Upstream(status, message));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::from_reqwest(e, self.timeout_secs))?;

        let text: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const MODEL: &str = "gemini-test";
    const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

    fn candidate(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
    }

    #[tokio::test]
    async fn sends_both_prompts_with_key_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "system" }, { "text": "user" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("{\"title\":\"x\"}")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GenerationClient::new("test-key", &server.uri(), MODEL, 5).unwrap();
        let text = client.generate("system", "user").await.unwrap();

        assert_eq!(text, "{\"title\":\"x\"}");
    }

    #[tokio::test]
    async fn concatenates_text_parts() {
        let server = MockServer::start().await;

        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "```json\n" }, { "text": "{}\n```" }] } }]
        });
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = GenerationClient::new("test-key", &server.uri(), MODEL, 5).unwrap();
        let text = client.generate("system", "user").await.unwrap();

        assert_eq!(text, "```json\n{}\n```");
    }

    #[tokio::test]
    async fn surfaces_upstream_error_message() {
        let server = MockServer::start().await;

        let body = json!({
            "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
        });
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(400).set_body_json(body))
            .mount(&server)
            .await;

        let client = GenerationClient::new("secret-key", &server.uri(), MODEL, 5).unwrap();
        let err = client.generate("system", "user").await.unwrap_err();

        assert!(matches!(err, GenerationError::Upstream(status, _) if status == StatusCode::BAD_REQUEST));
        assert_eq!(err.public_message(), "API key not valid");
        assert!(!err.to_string().contains("secret-key"));
    }

    #[tokio::test]
    async fn empty_upstream_message_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = GenerationClient::new("test-key", &server.uri(), MODEL, 5).unwrap();
        let err = client.generate("system", "user").await.unwrap_err();

        assert_eq!(err.public_message(), "Failed to generate quiz");
    }

    #[tokio::test]
    async fn missing_candidates_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let client = GenerationClient::new("test-key", &server.uri(), MODEL, 5).unwrap();
        let err = client.generate("system", "user").await.unwrap_err();

        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate("late"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client = GenerationClient::new("test-key", &server.uri(), MODEL, 1).unwrap();
        let err = client.generate("system", "user").await.unwrap_err();

        assert!(matches!(err, GenerationError::Timeout(1)));
    }

    #[test]
    fn blank_key_means_unconfigured() {
        let config = GenerationConfig {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert!(GenerationClient::from_config(&config).unwrap().is_none());

        let config = GenerationConfig {
            api_key: Some("key".into()),
            ..Default::default()
        };
        assert!(GenerationClient::from_config(&config).unwrap().is_some());
    }
}
