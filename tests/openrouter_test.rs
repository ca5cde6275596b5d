//! Upstream behaviour of the OpenRouter provider against a mock server:
//! headers and payload, 429 handling, retries and exhaustion.

use serde_json::json;
use std::time::Duration;
use tutorbot::config::Config;
use tutorbot::errors::ProviderError;
use tutorbot::providers::{OpenRouterProvider, TutorProvider};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

fn test_config(server: &MockServer) -> Config {
    Config {
        openrouter_api_key: Some("sk-test".to_string()),
        openrouter_api_url: format!("{}{}", server.uri(), COMPLETIONS_PATH),
        min_delay: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "gen-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[tokio::test]
async fn test_sends_expected_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("x-title", "AI TutorBot"))
        .and(header("http-referer", "https://your-tutorbot.app"))
        .and(body_partial_json(json!({
            "model": "openrouter/auto",
            "messages": [{ "role": "user", "content": "Explain photosynthesis" }],
            "max_tokens": 200,
            "user": "student-42"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "\n  Plants turn sunlight into sugar.  \n",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::from_config(&test_config(&server)).unwrap();
    let reply = provider
        .ask("Explain photosynthesis", "student-42")
        .await
        .unwrap();

    assert_eq!(reply, "Plants turn sunlight into sugar.");
}

#[tokio::test]
async fn test_retries_after_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Second time lucky")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::from_config(&test_config(&server)).unwrap();
    let reply = provider.ask("prompt", "s-1").await.unwrap();
    assert_eq!(reply, "Second time lucky");
}

#[tokio::test]
async fn test_server_error_exhausts_attempts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(3)
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::from_config(&test_config(&server)).unwrap();
    let err = provider.ask("prompt", "s-1").await.unwrap_err();

    match err {
        ProviderError::Exhausted {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("500"), "last error was: {}", last_error);
            assert!(last_error.contains("upstream down"));
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_reply_is_retried_then_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .expect(2)
        .mount(&server)
        .await;

    let config = Config {
        max_attempts: 2,
        ..test_config(&server)
    };
    let provider = OpenRouterProvider::from_config(&config).unwrap();
    let err = provider.ask("prompt", "s-1").await.unwrap_err();

    assert!(matches!(
        err,
        ProviderError::Exhausted { attempts: 2, ref last_error }
            if last_error == "Empty response from OpenRouter"
    ));
}

#[tokio::test]
async fn test_rate_limited_on_every_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::from_config(&test_config(&server)).unwrap();
    let err = provider.ask("prompt", "s-1").await.unwrap_err();

    assert!(matches!(err, ProviderError::Exhausted { attempts: 3, .. }));
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        openrouter_api_key: None,
        ..test_config(&server)
    };
    let provider = OpenRouterProvider::from_config(&config).unwrap();
    let err = provider.ask("prompt", "s-1").await.unwrap_err();

    assert!(matches!(err, ProviderError::MissingApiKey));
}
