use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::EmbeddingConfig;

/// Synopses longer than this many characters are cut before embedding.
const MAX_SYNOPSIS_CHARS: usize = 4_000;

/// Embedding API flavour selected by `EmbeddingConfig::provider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    /// Ollama `/api/embed`
    Ollama,
    /// Any OpenAI-compatible `/v1/embeddings`
    OpenAi,
}

impl Backend {
    fn from_provider(provider: &str) -> Result<Self> {
        match provider {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            other => anyhow::bail!("Unknown embedding provider: {other}"),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAi => "OpenAI",
        }
    }

    fn endpoint(self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Self::Ollama => format!("{base}/api/embed"),
            Self::OpenAi => format!("{base}/v1/embeddings"),
        }
    }

    fn batch_size(self) -> usize {
        match self {
            Self::Ollama => 32,
            Self::OpenAi => 64,
        }
    }

    fn request_body(self, model: &str, input: &[&str]) -> Value {
        match self {
            // Ollama may still 400 on overlong input even with truncate set
            Self::Ollama => json!({ "model": model, "input": input, "truncate": true }),
            Self::OpenAi => json!({ "model": model, "input": input }),
        }
    }
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    embedding: Vec<f32>,
}

/// Cut `text` to at most `MAX_SYNOPSIS_CHARS` characters.
fn clip(text: &str) -> &str {
    match text.char_indices().nth(MAX_SYNOPSIS_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Embed every text, preserving input order.
///
/// Inputs are sent in provider-sized batches; each batch must come back with
/// exactly one vector per input.
pub async fn embed_batch(
    client: &reqwest::Client,
    config: &EmbeddingConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let backend = Backend::from_provider(&config.provider)?;
    let url = backend.endpoint(&config.base_url);
    let batches = texts.len().div_ceil(backend.batch_size());
    let mut vectors = Vec::with_capacity(texts.len());

    for (i, batch) in texts.chunks(backend.batch_size()).enumerate() {
        let input: Vec<&str> = batch.iter().map(|t| clip(t)).collect();
        let body = backend.request_body(&config.model, &input);

        let embedded = match backend {
            Backend::Ollama => {
                post::<OllamaEmbedResponse>(client, config, backend, &url, &body)
                    .await?
                    .embeddings
            }
            Backend::OpenAi => post::<OpenAiEmbedResponse>(client, config, backend, &url, &body)
                .await?
                .data
                .into_iter()
                .map(|d| d.embedding)
                .collect(),
        };

        anyhow::ensure!(
            embedded.len() == batch.len(),
            "{} returned {} embeddings for {} inputs",
            backend.label(),
            embedded.len(),
            batch.len()
        );
        vectors.extend(embedded);

        if batches > 1 {
            tracing::debug!("Embedded batch {}/{batches}", i + 1);
        }
    }

    Ok(vectors)
}

/// Embed a single query string.
pub async fn embed_single(
    client: &reqwest::Client,
    config: &EmbeddingConfig,
    text: &str,
) -> Result<Vec<f32>> {
    embed_batch(client, config, &[text.to_string()])
        .await?
        .into_iter()
        .next()
        .context("Embedding API returned no vector")
}

async fn post<T: DeserializeOwned>(
    client: &reqwest::Client,
    config: &EmbeddingConfig,
    backend: Backend,
    url: &str,
    body: &Value,
) -> Result<T> {
    let mut req = client.post(url).json(body);
    if let Some(key) = config.api_key.as_deref() {
        req = req.bearer_auth(key);
    }

    let resp = req
        .send()
        .await
        .with_context(|| format!("Failed to call {} embed API", backend.label()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        anyhow::bail!("{} embed API returned {status}: {text}", backend.label());
    }

    resp.json()
        .await
        .with_context(|| format!("Failed to parse {} embed response", backend.label()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(clip("Cowboy Bebop"), "Cowboy Bebop");
    }

    #[test]
    fn test_clip_counts_chars_not_bytes() {
        let text = "é".repeat(MAX_SYNOPSIS_CHARS + 10);
        let cut = clip(&text);
        assert_eq!(cut.chars().count(), MAX_SYNOPSIS_CHARS);
    }

    #[test]
    fn test_endpoints_ignore_trailing_slash() {
        assert_eq!(
            Backend::Ollama.endpoint("http://localhost:11434/"),
            "http://localhost:11434/api/embed"
        );
        assert_eq!(
            Backend::OpenAi.endpoint("https://api.openai.com"),
            "https://api.openai.com/v1/embeddings"
        );
    }

    #[test]
    fn test_ollama_body_requests_truncation() {
        let body = Backend::Ollama.request_body("nomic-embed-text", &["a", "b"]);
        assert_eq!(body["truncate"], true);
        assert_eq!(body["input"].as_array().map(Vec::len), Some(2));
        assert!(Backend::OpenAi.request_body("m", &["a"]).get("truncate").is_none());
    }

    #[tokio::test]
    async fn test_empty_batch_skips_network() {
        let client = reqwest::Client::new();
        let config = EmbeddingConfig {
            provider: "nonexistent".to_string(),
            ..EmbeddingConfig::default()
        };
        let out = embed_batch(&client, &config, &[]).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_provider_errors() {
        let client = reqwest::Client::new();
        let config = EmbeddingConfig {
            provider: "nonexistent".to_string(),
            ..EmbeddingConfig::default()
        };
        let err = embed_single(&client, &config, "akira").await.unwrap_err();
        assert!(err.to_string().contains("Unknown embedding provider"));
    }
}
