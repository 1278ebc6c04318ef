use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::models::Document;

/// A stored vector entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VectorEntry {
    document: Document,
    embedding: Vec<f32>,
}

/// In-memory vector store with disk persistence and cosine similarity search.
pub struct VectorStore {
    entries: RwLock<Vec<VectorEntry>>,
    persist_path: PathBuf,
    /// Modification time of the file the entries were loaded from
    loaded_mtime: RwLock<Option<SystemTime>>,
}

#[derive(Debug, Clone)]
pub struct VectorHit {
    pub document: Document,
    pub score: f32,
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn read_entries(path: &Path) -> Result<Vec<VectorEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = std::fs::read_to_string(path).context("Failed to read vector store")?;
    serde_json::from_str(&data).context("Vector store file is corrupt")
}

impl VectorStore {
    pub fn open_or_create(vector_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(vector_dir)?;
        let persist_path = vector_dir.join("vectors.json");

        let loaded_mtime = file_mtime(&persist_path);
        let entries = read_entries(&persist_path)?;

        Ok(Self {
            entries: RwLock::new(entries),
            persist_path,
            loaded_mtime: RwLock::new(loaded_mtime),
        })
    }

    /// Replace all vectors. `embeddings` must be parallel with `documents`.
    pub fn rebuild(&self, documents: &[Document], embeddings: Vec<Vec<f32>>) -> Result<()> {
        if documents.len() != embeddings.len() {
            anyhow::bail!(
                "Got {} embeddings for {} documents",
                embeddings.len(),
                documents.len()
            );
        }
        if let Some(dim) = embeddings.first().map(Vec::len) {
            anyhow::ensure!(
                embeddings.iter().all(|e| e.len() == dim),
                "Embeddings have mixed dimensions"
            );
        }

        let fresh: Vec<VectorEntry> = documents
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(document, embedding)| VectorEntry {
                document,
                embedding,
            })
            .collect();

        let data = serde_json::to_string(&fresh)?;
        // Atomic write via temp file + rename
        let tmp_path = self.persist_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, data).context("Failed to write vector store")?;
        std::fs::rename(&tmp_path, &self.persist_path)
            .context("Failed to replace vector store")?;

        *self.entries.write() = fresh;
        *self.loaded_mtime.write() = file_mtime(&self.persist_path);
        Ok(())
    }

    /// Reload from disk if another process rewrote the store file.
    ///
    /// Returns whether the entries changed.
    pub fn refresh(&self) -> Result<bool> {
        let on_disk = file_mtime(&self.persist_path);
        if on_disk == *self.loaded_mtime.read() {
            return Ok(false);
        }

        let entries = read_entries(&self.persist_path)?;
        tracing::info!("Vector store changed on disk; reloaded {} entries", entries.len());
        *self.entries.write() = entries;
        *self.loaded_mtime.write() = on_disk;
        Ok(true)
    }

    /// Dimension of the stored embeddings, `None` when empty.
    pub fn dimension(&self) -> Option<usize> {
        self.entries.read().first().map(|e| e.embedding.len())
    }

    /// Search by cosine similarity against a query embedding.
    ///
    /// A query whose dimension differs from the stored vectors is an error,
    /// typically an embedding model changed without re-indexing.
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<VectorHit>> {
        let entries = self.entries.read();

        if let Some(first) = entries.first() {
            anyhow::ensure!(
                query_embedding.len() == first.embedding.len(),
                "Query embedding has {} dimensions but the store holds {}; re-run build-index",
                query_embedding.len(),
                first.embedding.len()
            );
        }

        let mut scored: Vec<(f32, &VectorEntry)> = entries
            .iter()
            .map(|e| (cosine_similarity(query_embedding, &e.embedding), e))
            .collect();

        // Sort descending by score
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(score, e)| VectorHit {
                document: e.document.clone(),
                score,
            })
            .collect())
    }

    pub fn entry_count(&self) -> usize {
        self.entries.read().len()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_mismatched_dims() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_rebuild_rejects_length_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open_or_create(dir.path()).unwrap();
        let err = store.rebuild(&[Document::new("a")], vec![]).unwrap_err();
        assert!(err.to_string().contains("0 embeddings for 1 documents"));
    }

    #[test]
    fn test_rebuild_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = VectorStore::open_or_create(dir.path()).unwrap();
            store
                .rebuild(
                    &[Document::new("Akira"), Document::new("Trigun")],
                    vec![vec![1.0, 0.0], vec![0.0, 1.0]],
                )
                .unwrap();
        }
        let reopened = VectorStore::open_or_create(dir.path()).unwrap();
        assert_eq!(reopened.entry_count(), 2);
        let hits = reopened.search(&[0.1, 0.9], 1).unwrap();
        assert_eq!(hits[0].document.content, "Trigun");
    }

    #[test]
    fn test_search_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open_or_create(dir.path()).unwrap();
        store
            .rebuild(
                &[Document::new("Akira"), Document::new("Trigun")],
                vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
            )
            .unwrap();

        let err = store.search(&[1.0, 0.0], 2).unwrap_err();
        assert!(err.to_string().contains("2 dimensions but the store holds 3"));
        assert_eq!(store.dimension(), Some(3));
    }

    #[test]
    fn test_search_on_empty_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open_or_create(dir.path()).unwrap();
        assert!(store.search(&[1.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_rebuild_rejects_mixed_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let store = VectorStore::open_or_create(dir.path()).unwrap();
        let err = store
            .rebuild(
                &[Document::new("a"), Document::new("b")],
                vec![vec![1.0, 0.0], vec![1.0]],
            )
            .unwrap_err();
        assert!(err.to_string().contains("mixed dimensions"));
    }

    #[test]
    fn test_refresh_picks_up_external_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let serving = VectorStore::open_or_create(dir.path()).unwrap();
        assert_eq!(serving.entry_count(), 0);
        assert!(!serving.refresh().unwrap());

        let indexer = VectorStore::open_or_create(dir.path()).unwrap();
        indexer
            .rebuild(&[Document::new("Mushishi")], vec![vec![0.0, 1.0]])
            .unwrap();

        assert!(serving.refresh().unwrap());
        assert_eq!(serving.entry_count(), 1);
        assert!(!serving.refresh().unwrap());
    }
}
