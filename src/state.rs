use std::sync::Arc;

use crate::catalog::{JikanClient, MetadataLookup};
use crate::config::Config;
use crate::llm::ChatGenerator;
use crate::pipeline::{PipelineOptions, RecommendationPipeline};
use crate::search::bm25::Bm25Index;
use crate::search::vector::VectorStore;
use crate::search::{DenseRetriever, SparseRetriever};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<RecommendationPipeline>,
    /// Per-title metadata used by `/api/metadata` and enrichment
    pub metadata: Arc<dyn MetadataLookup>,
    /// Jikan client for the top-N listings
    pub catalog: Arc<JikanClient>,
}

impl AppState {
    /// Open the on-disk indexes and wire up the production collaborators.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(config.index_dir())?;
        std::fs::create_dir_all(config.vector_dir())?;

        let bm25 = Arc::new(Bm25Index::open_or_create(&config.index_dir())?);
        let vectors = Arc::new(VectorStore::open_or_create(&config.vector_dir())?);

        let indexed = bm25.doc_count()?;
        if indexed == 0 || vectors.entry_count() == 0 {
            tracing::warn!(
                "Indexes look empty (bm25: {indexed}, vectors: {}); run `build-index` first",
                vectors.entry_count()
            );
        } else {
            tracing::info!(
                "Loaded {indexed} BM25 documents and {} vectors",
                vectors.entry_count()
            );
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let dense = Arc::new(DenseRetriever::new(
            http_client.clone(),
            config.embedding.clone(),
            vectors,
        ));
        let sparse = Arc::new(SparseRetriever::new(bm25));
        let generator = Arc::new(ChatGenerator::new(http_client.clone(), config.llm.clone()));

        let pipeline = RecommendationPipeline::new(
            dense,
            sparse,
            generator,
            PipelineOptions::from(&config),
        );
        let catalog = Arc::new(JikanClient::new(http_client, config.catalog.clone()));

        Ok(Self::from_parts(config, pipeline, catalog.clone(), catalog))
    }

    /// Assemble state from already constructed collaborators.
    pub fn from_parts(
        config: Config,
        pipeline: RecommendationPipeline,
        metadata: Arc<dyn MetadataLookup>,
        catalog: Arc<JikanClient>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            metadata,
            catalog,
        }
    }

    pub fn metadata_lookup(&self) -> &dyn MetadataLookup {
        self.metadata.as_ref()
    }
}
