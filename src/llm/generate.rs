use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::GenerationError;
use crate::recommend::build_recommendation_prompt;

/// Text-completion service that turns retrieved context into a raw answer.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, context: &str, question: &str) -> Result<String, GenerationError>;
}

/// Chat-completion backed generator (Groq, OpenAI-compatible or Ollama).
pub struct ChatGenerator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ChatGenerator {
    pub fn new(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl AnswerGenerator for ChatGenerator {
    async fn generate(&self, context: &str, question: &str) -> Result<String, GenerationError> {
        let prompt = build_recommendation_prompt(context, question);

        let answer = match self.config.provider.as_str() {
            "groq" | "openai" => call_openai(&self.client, &self.config, &prompt).await?,
            "ollama" => call_ollama(&self.client, &self.config, &prompt).await?,
            other => return Err(GenerationError::UnsupportedProvider(other.to_string())),
        };

        if answer.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(answer)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(GenerationError::Status { status, body })
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Message,
}

async fn call_ollama(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
) -> Result<String, GenerationError> {
    let url = format!("{}/api/chat", config.base_url.trim_end_matches('/'));

    let req = OllamaChatRequest {
        model: config.chat_model.clone(),
        messages: vec![Message {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        stream: false,
        options: OllamaOptions {
            temperature: config.temperature,
        },
    };

    let resp = client
        .post(&url)
        .timeout(config.timeout())
        .json(&req)
        .send()
        .await?;

    let body: OllamaChatResponse = check_status(resp).await?.json().await?;
    Ok(body.message.content)
}

// ─── OpenAI-compatible (Groq, OpenAI) ────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

async fn call_openai(
    client: &reqwest::Client,
    config: &LlmConfig,
    prompt: &str,
) -> Result<String, GenerationError> {
    let url = format!("{}/v1/chat/completions", config.base_url.trim_end_matches('/'));
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiChatRequest {
        model: config.chat_model.clone(),
        messages: vec![Message {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        temperature: config.temperature,
    };

    let resp = client
        .post(&url)
        .timeout(config.timeout())
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await?;

    let body: OpenAiChatResponse = check_status(resp).await?.json().await?;
    first_choice_content(body).ok_or(GenerationError::Empty)
}

fn first_choice_content(body: OpenAiChatResponse) -> Option<String> {
    body.choices.into_iter().next().and_then(|c| c.message.content)
}
