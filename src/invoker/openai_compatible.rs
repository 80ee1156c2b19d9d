//! Chat-completions client for any OpenAI-compatible endpoint.
//!
//! Covers OpenAI itself and the many gateways and local servers that expose
//! the same `/chat/completions` route (LiteLLM proxies, Ollama, vLLM, ...).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::InvokeError;

use super::traits::{Completion, ModelInvoker};
use super::usage::Usage;

/// Client for an OpenAI-compatible chat-completions API.
#[derive(Debug)]
pub struct OpenAICompatible {
    base_url: Url,
    api_key: Option<SecretString>,
    client: Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMsg,
}

#[derive(Deserialize, Debug)]
struct ChatMsg {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAICompatible {
    /// Creates a client for `base_url`.
    ///
    /// `timeout_seconds` of `None` leaves calls without a deadline.
    pub fn new(
        base_url: &str,
        api_key: Option<SecretString>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, InvokeError> {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(sec));
        }
        Self::with_client(builder.build()?, base_url, api_key)
    }

    /// Creates a client with a custom HTTP client.
    pub fn with_client(
        client: Client,
        base_url: &str,
        api_key: Option<SecretString>,
    ) -> Result<Self, InvokeError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| InvokeError::InvalidRequest(format!("invalid base url {base_url}: {e}")))?;
        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self) -> Result<Url, InvokeError> {
        self.base_url
            .join("chat/completions")
            .map_err(|e| InvokeError::InvalidRequest(e.to_string()))
    }
}

fn status_error(status: StatusCode, body: String) -> InvokeError {
    let message = format!("{status}: {body}");
    match status.as_u16() {
        429 => InvokeError::RateLimited(message),
        502..=504 => InvokeError::ServiceUnavailable(message),
        401 | 403 => InvokeError::Auth(message),
        400 | 404 | 422 => InvokeError::InvalidRequest(message),
        _ => InvokeError::Provider(message),
    }
}

#[async_trait]
impl ModelInvoker for OpenAICompatible {
    async fn invoke(
        &self,
        model: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<Completion, InvokeError> {
        let body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            stream: false,
        };

        let mut request = self.client.post(self.endpoint()?).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        log::debug!("chat completion request: model={model} temperature={temperature}");
        let response = request.send().await?;
        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(status_error(status, raw));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&raw).map_err(|e| InvokeError::ResponseFormat {
                message: e.to_string(),
                raw_response: raw.clone(),
            })?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InvokeError::ResponseFormat {
                message: "response has no choices".to_string(),
                raw_response: raw.clone(),
            })?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: parsed.model.unwrap_or_else(|| model.to_string()),
            usage: parsed.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn client(url: &str) -> OpenAICompatible {
        OpenAICompatible::new(url, Some(SecretString::new("sk-test".into())), None).unwrap()
    }

    #[tokio::test]
    async fn parses_content_and_usage() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model":"gpt-4o","temperature":0.5}"#.to_string(),
            ))
            .with_status(200)
            .with_body(
                r#"{"model":"gpt-4o-2024","choices":[{"message":{"content":"B"}}],
                    "usage":{"prompt_tokens":10,"completion_tokens":1,"total_tokens":11}}"#,
            )
            .create_async()
            .await;

        let out = client(&server.url())
            .invoke("gpt-4o", "Questão?", 0.5)
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(out.content, "B");
        assert_eq!(out.model, "gpt-4o-2024");
        assert_eq!(out.usage.map(|u| u.total_tokens), Some(11));
    }

    #[tokio::test]
    async fn null_content_is_empty_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":null}}]}"#)
            .create_async()
            .await;

        let out = client(&server.url()).invoke("m", "p", 0.0).await.unwrap();
        assert_eq!(out.content, "");
        assert_eq!(out.model, "m");
    }

    #[rstest]
    #[case(429, true)]
    #[case(503, true)]
    #[case(502, true)]
    #[case(401, false)]
    #[case(400, false)]
    #[case(500, false)]
    #[tokio::test]
    async fn maps_status_to_error_kind(#[case] status: usize, #[case] transient: bool) {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(status)
            .with_body("nope")
            .create_async()
            .await;

        let err = client(&server.url())
            .invoke("m", "p", 1.0)
            .await
            .unwrap_err();
        assert_eq!(err.is_transient(), transient, "{err}");
    }

    #[tokio::test]
    async fn empty_choices_is_format_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client(&server.url()).invoke("m", "p", 0.0).await.unwrap_err();
        assert!(matches!(err, InvokeError::ResponseFormat { .. }));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let c = client("http://localhost:4000/v1");
        assert_eq!(
            c.endpoint().unwrap().as_str(),
            "http://localhost:4000/v1/chat/completions"
        );
    }
}
