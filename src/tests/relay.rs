use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use futures::future::join_all;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

use super::{UPSTREAM_PATH, post_json, send, test_app};

fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}

#[tokio::test]
async fn relays_prompt_pair_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPSTREAM_PATH))
        .and(header("x-goog-api-key", "relay-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "Y" }, { "text": "X" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("generated quiz")))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app(Some("relay-key"), &server.uri());
    let (status, body) = send(
        app,
        post_json(
            "/api/generate-quiz",
            r#"{"userPrompt":"X","systemPrompt":"Y"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "text": "generated quiz" }));
}

#[tokio::test]
async fn get_is_method_not_allowed() {
    let server = MockServer::start().await;
    let app = test_app(Some("relay-key"), &server.uri());

    let request = Request::builder()
        .method("GET")
        .uri("/api/generate-quiz")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "error": "Method Not Allowed" }));
}

#[tokio::test]
async fn missing_prompts_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("unused")))
        .expect(0)
        .mount(&server)
        .await;

    for body in ["{}", r#"{"userPrompt":"X"}"#, r#"{"userPrompt":"","systemPrompt":"Y"}"#, "not json"] {
        let app = test_app(Some("relay-key"), &server.uri());
        let (status, json) = send(app, post_json("/api/generate-quiz", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(json, json!({ "error": "Missing required prompts" }));
    }
}

#[tokio::test]
async fn missing_key_is_reported_before_prompts() {
    let server = MockServer::start().await;
    let app = test_app(None, &server.uri());

    let (status, body) = send(app, post_json("/api/generate-quiz", "{}")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "API key is not configured" }));
}

#[tokio::test]
async fn upstream_failure_surfaces_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPSTREAM_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(json!({ "error": { "code": 429, "message": "Quota exceeded" } })),
        )
        .mount(&server)
        .await;

    let app = test_app(Some("relay-key"), &server.uri());
    let (status, body) = send(
        app,
        post_json(
            "/api/generate-quiz",
            r#"{"userPrompt":"X","systemPrompt":"Y"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Quota exceeded" }));
    assert!(!body.to_string().contains("relay-key"));
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let server = MockServer::start().await;
    for n in 0..4 {
        Mock::given(method("POST"))
            .and(path(UPSTREAM_PATH))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "sys" }, { "text": format!("user {}", n) }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&format!("reply {}", n))))
            .expect(1)
            .mount(&server)
            .await;
    }

    let app = test_app(Some("relay-key"), &server.uri());
    let requests = (0..4).map(|n| {
        let body = json!({ "userPrompt": format!("user {}", n), "systemPrompt": "sys" });
        send(app.clone(), post_json("/api/generate-quiz", &body.to_string()))
    });

    let responses = join_all(requests).await;
    for (n, (status, body)) in responses.into_iter().enumerate() {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "text": format!("reply {}", n) }));
    }
}
