use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use super::TutorProvider;
use crate::config::Config;
use crate::errors::ProviderError;
use crate::{upstream_error, upstream_warn};

const MAX_BACKOFF: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    user: &'a str,
}

#[derive(Debug, Deserialize, Default)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize, Default)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize, Default)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn reply(self) -> Option<String> {
        let content = self.choices.into_iter().next()?.message?.content?;
        let content = content.trim();
        if content.is_empty() {
            None
        } else {
            Some(content.to_string())
        }
    }
}

enum Attempt {
    Reply(String),
    RateLimited(Duration),
}

/// Chat-completions client for OpenRouter with 429 handling and bounded retries.
pub struct OpenRouterProvider {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_attempts: u32,
    referer: String,
    title: String,
}

impl OpenRouterProvider {
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_key: config.openrouter_api_key.clone(),
            api_url: config.openrouter_api_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_attempts: config.max_attempts.max(1),
            referer: config.referer.clone(),
            title: config.app_title.clone(),
        })
    }

    async fn attempt(
        &self,
        api_key: &str,
        payload: &ChatCompletionRequest<'_>,
        attempt: u32,
    ) -> Result<Attempt, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let wait = retry_after(response.headers().get(RETRY_AFTER), attempt);
            return Ok(Attempt::RateLimited(wait));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let data: ChatCompletionResponse = response.json().await?;
        data.reply()
            .map(Attempt::Reply)
            .ok_or(ProviderError::EmptyResponse)
    }
}

/// Wait requested by a 429: the `Retry-After` seconds, or `2^attempt` seconds when absent.
fn retry_after(header: Option<&reqwest::header::HeaderValue>, attempt: u32) -> Duration {
    header
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| {
            let secs = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
            Duration::from_secs(secs).min(MAX_BACKOFF)
        })
}

#[async_trait]
impl TutorProvider for OpenRouterProvider {
    async fn ask(&self, prompt: &str, student_id: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey)?;

        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            user: student_id,
        };

        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            match self.attempt(api_key, &payload, attempt).await {
                Ok(Attempt::Reply(reply)) => return Ok(reply),
                Ok(Attempt::RateLimited(wait)) => {
                    upstream_warn!(attempt, "Rate limited. Retrying in {}s...", wait.as_secs());
                    last_error = "rate limited by upstream (429)".to_string();
                    // the final attempt has nothing left to wait for
                    if attempt < self.max_attempts {
                        sleep(wait).await;
                    }
                }
                Err(e) => {
                    upstream_error!(attempt, "Attempt {} failed: {}", attempt, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(ProviderError::Exhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }

    fn name(&self) -> &'static str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_retry_after_header() {
        let value = HeaderValue::from_static("7");
        assert_eq!(retry_after(Some(&value), 1), Duration::from_secs(7));
    }

    #[test]
    fn test_retry_after_falls_back_to_exponential() {
        assert_eq!(retry_after(None, 1), Duration::from_secs(2));
        assert_eq!(retry_after(None, 3), Duration::from_secs(8));

        let http_date = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(retry_after(Some(&http_date), 2), Duration::from_secs(4));
    }

    #[test]
    fn test_retry_after_is_capped() {
        assert_eq!(retry_after(None, 20), MAX_BACKOFF);
        assert_eq!(retry_after(None, 200), MAX_BACKOFF);
    }

    #[test]
    fn test_reply_extraction() {
        let data: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  A fraction is a part of a whole.  "}}]}"#,
        )
        .unwrap();
        assert_eq!(data.reply().as_deref(), Some("A fraction is a part of a whole."));

        let empty: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"   "}}]}"#).unwrap();
        assert_eq!(empty.reply(), None);

        let no_choices: ChatCompletionResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(no_choices.reply(), None);
    }

    #[test]
    fn test_payload_shape() {
        let payload = ChatCompletionRequest {
            model: "openrouter/auto",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.5,
            max_tokens: 200,
            user: "student-7",
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["model"], "openrouter/auto");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hello");
        assert_eq!(value["max_tokens"], 200);
        assert_eq!(value["user"], "student-7");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_fast() {
        let provider = OpenRouterProvider::from_config(&Config::default()).unwrap();
        let err = provider.ask("prompt", "s-1").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }
}
