//! Meta via OpenRouter adapter (MetaAI panel)
//!
//! OpenRouter speaks the OpenAI chat-completions wire format at its own base
//! URL. The adapter keeps its own file because its display name, fixed reply
//! strings, and system prompt all differ from the OpenAI adapter's.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::types::{NO_RESPONSE, ProviderAdapter};

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai";
pub const DEFAULT_OPENROUTER_MODEL: &str = "meta-llama/llama-3.1-70b-instruct";

/// Meta via OpenRouter adapter
pub struct OpenRouterAdapter {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for OpenRouterAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterAdapter")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("configured", &self.api_key.is_some())
            .finish()
    }
}

impl OpenRouterAdapter {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
        }
    }

    /// Extract the reply text at choices[0].message.content
    fn extract_reply(resp: ChatCompletionResponse) -> String {
        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_else(|| NO_RESPONSE.to_string())
    }
}

#[async_trait]
impl ProviderAdapter for OpenRouterAdapter {
    fn display_name(&self) -> &str {
        "MetaAI"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn ask(&self, prompt: &str) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            return Ok("Meta (via OpenRouter) not configured.".to_string());
        };

        let url = format!("{}/api/v1/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are Meta AI (Llama 3 family)."},
                {"role": "user", "content": prompt}
            ],
        });

        debug!("OpenRouter request: model={}", self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .context("Failed to send request to OpenRouter API")?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .context("Failed to read OpenRouter error body")?;
            return Ok(format!("Meta(OpenRouter) error: {error_text}"));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse OpenRouter API response")?;

        Ok(Self::extract_reply(api_response))
    }
}

// ── OpenRouter wire types (OpenAI-compatible) ──

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(api_key: Option<&str>, base_url: &str) -> OpenRouterAdapter {
        OpenRouterAdapter::new(
            api_key.map(String::from),
            DEFAULT_OPENROUTER_MODEL.to_string(),
            base_url.to_string(),
        )
    }

    #[tokio::test]
    async fn test_unconfigured_makes_no_call() {
        let server = MockServer::start().await;
        let reply = adapter(None, &server.uri()).ask("hello").await.unwrap();
        assert_eq!(reply, "Meta (via OpenRouter) not configured.");
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_extracts_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Hello from Llama"}}]
            })))
            .mount(&server)
            .await;

        let reply = adapter(Some("test-key"), &server.uri())
            .ask("hello")
            .await
            .unwrap();
        assert_eq!(reply, "Hello from Llama");
    }

    #[tokio::test]
    async fn test_error_status_embeds_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream busy"))
            .mount(&server)
            .await;

        let reply = adapter(Some("test-key"), &server.uri())
            .ask("hello")
            .await
            .unwrap();
        assert_eq!(reply, "Meta(OpenRouter) error: upstream busy");
    }

    #[tokio::test]
    async fn test_missing_content_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant"}}]
            })))
            .mount(&server)
            .await;

        let reply = adapter(Some("test-key"), &server.uri())
            .ask("hello")
            .await
            .unwrap();
        assert_eq!(reply, NO_RESPONSE);
    }

    #[test]
    fn test_debug_hides_key() {
        let a = adapter(Some("sk-or-secret"), DEFAULT_OPENROUTER_BASE_URL);
        let debug = format!("{a:?}");
        assert!(!debug.contains("sk-or-secret"));
    }
}
