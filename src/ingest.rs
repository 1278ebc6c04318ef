use anyhow::{Context, Result};

use crate::catalog::loader::{load_records, to_documents};
use crate::config::Config;
use crate::llm::embeddings::embed_batch;
use crate::search::bm25::Bm25Index;
use crate::search::vector::VectorStore;

/// Summary of an index build.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    pub records: usize,
    pub documents: usize,
}

/// Build the BM25 index and vector store from the configured corpus.
///
/// Both indexes are replaced wholesale. Embeddings are computed before
/// anything is written, so an embedding failure leaves the old indexes intact.
pub async fn build_indexes(config: &Config, client: &reqwest::Client) -> Result<IngestReport> {
    let records = load_records(&config.corpus_path)?;
    let documents = to_documents(&records);
    if documents.is_empty() {
        anyhow::bail!(
            "Corpus {} has no complete anime records",
            config.corpus_path.display()
        );
    }
    tracing::info!(
        "Loaded {} documents from {}",
        documents.len(),
        config.corpus_path.display()
    );

    let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
    let embeddings = embed_batch(client, &config.embedding, &texts)
        .await
        .context("Failed to embed corpus")?;
    tracing::info!("Embedded {} documents", embeddings.len());

    let index_dir = config.index_dir();
    let bm25_docs = documents.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let bm25 = Bm25Index::open_or_create(&index_dir)?;
        bm25.rebuild(&bm25_docs)
    })
    .await
    .context("BM25 indexing task panicked")??;

    let store = VectorStore::open_or_create(&config.vector_dir())?;
    store.rebuild(&documents, embeddings)?;

    Ok(IngestReport {
        records: records.len(),
        documents: documents.len(),
    })
}
