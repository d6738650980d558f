//! Google Gemini `generateContent` provider.

use super::http::{client, ensure_success, non_empty};
use super::{GenerationError, ProviderSettings, ScriptGenerator};
use crate::prompt::ScenePrompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Generator backed by `POST {base_url}/models/{model}:generateContent`.
pub struct GeminiGenerator {
    client: reqwest::Client,
    settings: ProviderSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationSettings,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiGenerator {
    /// Create a generator for the given provider settings.
    pub fn new(settings: ProviderSettings) -> Result<Self, GenerationError> {
        Ok(Self {
            client: client(settings.request_timeout)?,
            settings,
        })
    }

    fn request_body<'a>(&self, prompt: &'a ScenePrompt) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &prompt.system,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &prompt.user }],
            }],
            generation_config: GenerationSettings {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_tokens,
            },
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn candidate_text(response: GenerateResponse) -> Result<String, GenerationError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    non_empty(text)
}

#[async_trait]
impl ScriptGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &ScenePrompt) -> Result<String, GenerationError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url, self.settings.model
        );
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let response = ensure_success(response).await?;
        candidate_text(response.json::<GenerateResponse>().await?)
    }
}
