use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Dataset file looked up under the data directory by default.
pub const DEFAULT_CORPUS_FILE: &str = "anime_with_synopsis.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where the BM25 index and vector store live
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Dataset used by the index builder (JSON array of anime records)
    pub corpus_path: PathBuf,
    /// Answer generator configuration
    pub llm: LlmConfig,
    /// Embedding provider configuration (dense retrieval)
    pub embedding: EmbeddingConfig,
    /// Retrieval and context assembly settings
    pub retrieval: RetrievalConfig,
    /// Retry policy for generation calls
    pub retry: RetryConfig,
    /// Jikan metadata catalog
    pub catalog: CatalogConfig,
    /// How enriched results treat titles the catalog could not match
    pub unmatched_policy: UnmatchedTitlePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "groq", "openai" or "ollama"
    pub provider: String,
    /// Base URL for the chat API (without the `/v1/...` suffix)
    pub base_url: String,
    /// Model name for recommendations
    pub chat_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    pub temperature: f32,
    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama" or "openai"
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Documents requested from each retriever
    pub top_k: usize,
    /// Cap on assembled context length in characters (0 = unlimited)
    pub max_context_chars: usize,
    /// Per-retriever timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    /// Per-lookup timeout in seconds
    pub timeout_secs: u64,
}

/// What an enriched response does with a title the catalog has no entry for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedTitlePolicy {
    /// Keep the card, flagged as "details unavailable".
    #[default]
    Placeholder,
    /// Drop the card from the enriched list.
    Omit,
}

impl UnmatchedTitlePolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placeholder" => Some(Self::Placeholder),
            "omit" => Some(Self::Omit),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:8000".to_string(),
            corpus_path: PathBuf::from("./data").join(DEFAULT_CORPUS_FILE),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            retry: RetryConfig::default(),
            catalog: CatalogConfig::default(),
            unmatched_policy: UnmatchedTitlePolicy::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            base_url: "https://api.groq.com/openai".to_string(),
            chat_model: "llama-3.1-8b-instant".to_string(),
            api_key: None,
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            api_key: None,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_context_chars: 12_000,
            timeout_secs: 15,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 5_000,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            timeout_secs: 10,
        }
    }
}

impl RetrievalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_context_chars(&self) -> Option<usize> {
        (self.max_context_chars > 0).then_some(self.max_context_chars)
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, target: &mut T) {
    if let Ok(val) = std::env::var(key) {
        match val.trim().parse() {
            Ok(v) => *target = v,
            Err(_) => tracing::warn!("Ignoring unparseable {key}={val}"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("ANIME_REC_DATA_DIR") {
            config.data_dir = PathBuf::from(&dir);
            config.corpus_path = config.data_dir.join(DEFAULT_CORPUS_FILE);
        }
        if let Ok(addr) = std::env::var("ANIME_REC_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(path) = std::env::var("ANIME_REC_CORPUS_PATH") {
            config.corpus_path = PathBuf::from(path);
        }

        // Generator
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        env_parse("LLM_TEMPERATURE", &mut config.llm.temperature);
        env_parse("LLM_TIMEOUT_SECS", &mut config.llm.timeout_secs);

        // Embeddings
        if let Ok(provider) = std::env::var("EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Ok(url) = std::env::var("EMBEDDING_BASE_URL") {
            config.embedding.base_url = url;
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Ok(key) = std::env::var("EMBEDDING_API_KEY") {
            config.embedding.api_key = Some(key);
        }

        env_parse("ANIME_REC_TOP_K", &mut config.retrieval.top_k);
        env_parse(
            "ANIME_REC_MAX_CONTEXT_CHARS",
            &mut config.retrieval.max_context_chars,
        );
        env_parse(
            "ANIME_REC_RETRIEVAL_TIMEOUT_SECS",
            &mut config.retrieval.timeout_secs,
        );

        env_parse("ANIME_REC_MAX_RETRIES", &mut config.retry.max_retries);
        env_parse(
            "ANIME_REC_RETRY_BACKOFF_MS",
            &mut config.retry.initial_backoff_ms,
        );
        env_parse("ANIME_REC_MAX_BACKOFF_MS", &mut config.retry.max_backoff_ms);

        if let Ok(url) = std::env::var("JIKAN_BASE_URL") {
            config.catalog.base_url = url;
        }
        env_parse("JIKAN_TIMEOUT_SECS", &mut config.catalog.timeout_secs);

        if let Ok(val) = std::env::var("ANIME_REC_UNMATCHED_POLICY") {
            match UnmatchedTitlePolicy::parse(&val) {
                Some(policy) => config.unmatched_policy = policy,
                None => tracing::warn!("Unknown ANIME_REC_UNMATCHED_POLICY={val}, keeping default"),
            }
        }

        config
    }

    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    pub fn vector_dir(&self) -> PathBuf {
        self.data_dir.join("vectors")
    }
}
