use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::*;
use tantivy::{doc, Index, IndexWriter, ReloadPolicy};

use crate::models::Document;

const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// BM25 keyword index over anime documents, built on tantivy.
pub struct Bm25Index {
    index: Index,
    f_title: Field,
    f_content: Field,
    f_metadata: Field,
}

#[derive(Debug, Clone)]
pub struct Bm25Hit {
    pub document: Document,
    pub score: f32,
}

fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    schema_builder.add_text_field("title", TEXT | STORED);
    schema_builder.add_text_field("content", TEXT | STORED);
    // Document metadata serialized as a JSON object string
    schema_builder.add_text_field("metadata", STORED);
    schema_builder.build()
}

impl Bm25Index {
    /// Create or open a BM25 index at the given directory.
    pub fn open_or_create(index_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;

        let index = if index_dir.join("meta.json").exists() {
            Index::open_in_dir(index_dir).context("Failed to open existing tantivy index")?
        } else {
            Index::create_in_dir(index_dir, build_schema())
                .context("Failed to create tantivy index")?
        };

        let schema = index.schema();
        let field = |name: &str| {
            schema
                .get_field(name)
                .with_context(|| format!("Index schema is missing the '{name}' field"))
        };

        Ok(Self {
            f_title: field("title")?,
            f_content: field("content")?,
            f_metadata: field("metadata")?,
            index,
        })
    }

    /// Replace the whole index with `documents`.
    pub fn rebuild(&self, documents: &[Document]) -> Result<()> {
        let mut writer: IndexWriter = self
            .index
            .writer(WRITER_MEMORY_BYTES)
            .context("Failed to create index writer")?;

        writer
            .delete_all_documents()
            .context("Failed to clear index")?;

        for document in documents {
            let title = document.metadata.get("title").cloned().unwrap_or_default();
            let metadata = serde_json::to_string(&document.metadata)?;
            writer.add_document(doc!(
                self.f_title => title,
                self.f_content => document.content.clone(),
                self.f_metadata => metadata,
            ))?;
        }

        writer.commit().context("Failed to commit index")?;
        tracing::info!("BM25 index rebuilt with {} documents", documents.len());
        Ok(())
    }

    /// Number of documents currently searchable.
    pub fn doc_count(&self) -> Result<u64> {
        let reader = self.index.reader().context("Failed to create reader")?;
        Ok(reader.searcher().num_docs())
    }

    /// Search the index and return scored hits, best first.
    ///
    /// Free text is parsed leniently so stray quotes or colons in a "vibe"
    /// query never turn into a syntax error.
    pub fn search(&self, query_str: &str, limit: usize) -> Result<Vec<Bm25Hit>> {
        if limit == 0 || query_str.trim().is_empty() {
            return Ok(Vec::new());
        }

        let reader = self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()
            .context("Failed to create reader")?;

        let searcher = reader.searcher();

        let query_parser = QueryParser::for_index(&self.index, vec![self.f_content, self.f_title]);
        let (query, errors) = query_parser.parse_query_lenient(query_str);
        if !errors.is_empty() {
            tracing::debug!("BM25 query parsed leniently ({} issues): {query_str}", errors.len());
        }

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .context("Search failed")?;

        let mut hits = Vec::with_capacity(top_docs.len());

        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(doc_address)
                .context("Failed to retrieve document")?;

            let content = doc
                .get_first(self.f_content)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();

            let metadata: BTreeMap<String, String> = doc
                .get_first(self.f_metadata)
                .and_then(|v| v.as_str())
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or_default();

            hits.push(Bm25Hit {
                document: Document { content, metadata },
                score,
            });
        }

        Ok(hits)
    }
}
