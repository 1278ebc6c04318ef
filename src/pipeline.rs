//! The recommendation pipeline as an explicitly constructed service object.
//!
//! ```text
//!   query ──┬──▶ dense retriever ──┐
//!           └──▶ sparse retriever ─┴──▶ merge ──▶ budget ──▶ assemble
//!                                                              │
//!                         parse ◀── generate (bounded retry) ◀─┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::PipelineError;
use crate::llm::{with_retry, AnswerGenerator, RetryPolicy};
use crate::models::{Document, StructuredRecommendation};
use crate::recommend::parse;
use crate::search::{apply_budget, assemble, merge, ContextBudget, Retriever};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Documents requested from each retriever
    pub top_k: usize,
    pub budget: ContextBudget,
    pub retrieval_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            budget: ContextBudget {
                max_chars: config.retrieval.max_context_chars(),
            },
            retrieval_timeout: config.retrieval.timeout(),
            retry: RetryPolicy::from(&config.retry),
        }
    }
}

/// Result of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct RecommendOutcome {
    pub recommendations: StructuredRecommendation,
    /// Documents that made it into the context after merge and budget
    pub documents_used: usize,
    pub context_chars: usize,
}

pub struct RecommendationPipeline {
    dense: Arc<dyn Retriever>,
    sparse: Arc<dyn Retriever>,
    generator: Arc<dyn AnswerGenerator>,
    options: PipelineOptions,
}

impl RecommendationPipeline {
    pub fn new(
        dense: Arc<dyn Retriever>,
        sparse: Arc<dyn Retriever>,
        generator: Arc<dyn AnswerGenerator>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            dense,
            sparse,
            generator,
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Retrieve from both sources concurrently and merge.
    ///
    /// A retriever that errors or times out contributes nothing; if both do,
    /// the result is empty and the caller still proceeds.
    pub async fn retrieve(&self, query: &str) -> Vec<Document> {
        let (dense, sparse) = tokio::join!(
            self.retrieve_from(self.dense.as_ref(), query),
            self.retrieve_from(self.sparse.as_ref(), query),
        );
        tracing::debug!(
            dense = dense.len(),
            sparse = sparse.len(),
            "Retrieved candidates"
        );
        merge(dense, sparse)
    }

    async fn retrieve_from(&self, retriever: &dyn Retriever, query: &str) -> Vec<Document> {
        let k = self.options.top_k;
        match tokio::time::timeout(self.options.retrieval_timeout, retriever.retrieve(query, k))
            .await
        {
            Ok(Ok(docs)) => docs,
            Ok(Err(e)) => {
                tracing::warn!("{} retrieval failed, continuing without it: {e:#}", retriever.name());
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(
                    "{} retrieval timed out after {:?}, continuing without it",
                    retriever.name(),
                    self.options.retrieval_timeout
                );
                Vec::new()
            }
        }
    }

    /// Run the full pipeline for one query.
    pub async fn recommend(&self, query: &str) -> Result<RecommendOutcome, PipelineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::EmptyQuery);
        }

        let merged = self.retrieve(query).await;
        let docs = apply_budget(merged, self.options.budget);
        let context = assemble(&docs);
        if docs.is_empty() {
            tracing::warn!("No context retrieved for query; asking generator anyway");
        }

        let generator = self.generator.as_ref();
        let raw = with_retry(self.options.retry, || generator.generate(&context, query)).await?;

        let recommendations = parse(&raw);
        if recommendations.is_empty() {
            tracing::info!("Generator answer yielded no recommendations");
        }

        Ok(RecommendOutcome {
            recommendations,
            documents_used: docs.len(),
            context_chars: context.chars().count(),
        })
    }
}
