use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::llm::embeddings::embed_single;
use crate::models::Document;
use crate::search::bm25::Bm25Index;
use crate::search::vector::VectorStore;

/// Source of ranked candidate documents for a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Up to `k` documents, best first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>>;
}

/// Keyword retrieval over the BM25 index.
pub struct SparseRetriever {
    index: Arc<Bm25Index>,
}

impl SparseRetriever {
    pub fn new(index: Arc<Bm25Index>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Retriever for SparseRetriever {
    fn name(&self) -> &'static str {
        "bm25"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        let index = self.index.clone();
        let query = query.to_string();
        let hits = tokio::task::spawn_blocking(move || index.search(&query, k))
            .await
            .context("BM25 search task panicked")??;
        Ok(hits.into_iter().map(|h| h.document).collect())
    }
}

/// Embedding-similarity retrieval over the vector store.
pub struct DenseRetriever {
    client: reqwest::Client,
    config: EmbeddingConfig,
    store: Arc<VectorStore>,
}

impl DenseRetriever {
    pub fn new(client: reqwest::Client, config: EmbeddingConfig, store: Arc<VectorStore>) -> Self {
        Self {
            client,
            config,
            store,
        }
    }
}

#[async_trait]
impl Retriever for DenseRetriever {
    fn name(&self) -> &'static str {
        "vector"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        if let Err(e) = self.store.refresh() {
            tracing::warn!("Vector store reload failed, serving previous entries: {e:#}");
        }

        let embedding = embed_single(&self.client, &self.config, query)
            .await
            .context("Failed to embed query")?;
        let hits = self.store.search(&embedding, k)?;
        Ok(hits.into_iter().map(|h| h.document).collect())
    }
}
