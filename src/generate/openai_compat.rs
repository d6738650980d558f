//! OpenAI-compatible chat-completions provider (Groq by default).

use super::http::{client, ensure_success, non_empty};
use super::{GenerationError, ProviderSettings, ScriptGenerator};
use crate::prompt::ScenePrompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Generator backed by a `POST {base_url}/chat/completions` endpoint.
pub struct OpenAiCompatGenerator {
    client: reqwest::Client,
    settings: ProviderSettings,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatGenerator {
    /// Create a generator for the given provider settings.
    pub fn new(settings: ProviderSettings) -> Result<Self, GenerationError> {
        Ok(Self {
            client: client(settings.request_timeout)?,
            settings,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a ScenePrompt) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String, GenerationError> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();
    non_empty(text)
}

#[async_trait]
impl ScriptGenerator for OpenAiCompatGenerator {
    fn name(&self) -> &str {
        "openai_compat"
    }

    async fn generate(&self, prompt: &ScenePrompt) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.settings.base_url))
            .bearer_auth(&self.settings.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let response = ensure_success(response).await?;
        first_choice_text(response.json::<ChatResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::test_server::{closed_port_url, serve_once};
    use std::time::Duration;

    fn settings(base_url: String) -> ProviderSettings {
        ProviderSettings {
            base_url,
            api_key: "sk-test".to_string(),
            model: "qwen-2.5-coder-32b".to_string(),
            temperature: 0.2,
            max_tokens: 4000,
            request_timeout: Duration::from_secs(5),
        }
    }

    fn prompt() -> ScenePrompt {
        ScenePrompt {
            system: "be terse".to_string(),
            user: "draw a circle".to_string(),
        }
    }

    #[test]
    fn request_body_carries_both_messages() {
        let generator = OpenAiCompatGenerator::new(settings("http://unused".into())).unwrap();
        let prompt = prompt();
        let body = serde_json::to_value(generator.request_body(&prompt)).unwrap();

        assert_eq!(body["model"], "qwen-2.5-coder-32b");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "be terse");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "draw a circle");
        assert_eq!(body["max_tokens"], 4000);
    }

    #[test]
    fn missing_content_is_empty_response() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            first_choice_text(response),
            Err(GenerationError::EmptyResponse)
        ));

        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_choice_text(response),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn generate_returns_first_choice() {
        let server = serve_once(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"from manim import *"}}]}"#,
        )
        .await;
        let generator = OpenAiCompatGenerator::new(settings(server.base_url.clone())).unwrap();

        let text = generator.generate(&prompt()).await.unwrap();
        assert_eq!(text, "from manim import *");

        let request = server.request().await;
        assert!(request.starts_with("POST /chat/completions"));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
    }

    #[tokio::test]
    async fn rate_limit_is_quota_error() {
        let server = serve_once(429, r#"{"error":"rate limited"}"#).await;
        let generator = OpenAiCompatGenerator::new(settings(server.base_url.clone())).unwrap();

        let err = generator.generate(&prompt()).await.unwrap_err();
        assert!(matches!(err, GenerationError::QuotaExhausted { status: 429, .. }));
    }

    #[tokio::test]
    async fn unreachable_server_is_request_error() {
        let generator = OpenAiCompatGenerator::new(settings(closed_port_url().await)).unwrap();
        let err = generator.generate(&prompt()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Request(_)));
    }
}
