//! # anime-recommender
//!
//! A web service that answers a free-text "vibe" query with a short list of
//! anime recommendations. Candidate synopses come from a hybrid of BM25
//! keyword search and embedding similarity; an LLM writes the ranked list and
//! per-title analysis; the answer is parsed back into typed pairs and can be
//! enriched with live poster and score data from Jikan.
//!
//! ## Architecture
//!
//! ```text
//!                        ┌──────────────┐
//!                        │  Vibe Query  │
//!                        └──────┬───────┘
//!                 ┌─────────────┴─────────────┐
//!                 ▼                           ▼
//!        ┌────────────────┐         ┌──────────────────┐
//!        │ BM25 (tantivy) │         │ Vector (cosine)  │
//!        │    top k=5     │         │     top k=5      │
//!        └───────┬────────┘         └────────┬─────────┘
//!                └─────────────┬─────────────┘
//!                              ▼
//!                 ┌─────────────────────────┐
//!                 │  Merge: dense then      │
//!                 │  sparse, dedupe by text │
//!                 └────────────┬────────────┘
//!                              ▼
//!                 ┌─────────────────────────┐
//!                 │ Context budget + join   │
//!                 └────────────┬────────────┘
//!                              ▼
//!                 ┌─────────────────────────┐
//!                 │ LLM answer (retry with  │
//!                 │ exponential backoff)    │
//!                 └────────────┬────────────┘
//!                              ▼
//!                 ┌─────────────────────────┐
//!                 │ Parse: title line +     │
//!                 │ "|||" explanations      │
//!                 └────────────┬────────────┘
//!                              ▼
//!                 ┌─────────────────────────┐
//!                 │ Jikan enrichment        │
//!                 │ (per title, concurrent) │
//!                 └─────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for server, indexes, LLM, embeddings and catalog
//! - [`models`] - Shared data types: `Document`, `StructuredRecommendation`, request/response types
//! - [`error`] - Generation and pipeline error types
//! - [`search::bm25`] - BM25 keyword index powered by tantivy
//! - [`search::vector`] - In-memory vector store with cosine similarity and disk persistence
//! - [`search::hybrid`] - Order-stable merge, context assembly and context budget
//! - [`search::retriever`] - `Retriever` trait with BM25 and embedding-backed implementations
//! - [`llm::embeddings`] - Batch embedding generation via Ollama or OpenAI-compatible APIs
//! - [`llm::generate`] - `AnswerGenerator` trait and the chat-completion implementation
//! - [`llm::retry`] - Bounded retry with exponential backoff for transient failures
//! - [`recommend`] - Recommendation prompt and the total answer parser
//! - [`catalog`] - Dataset loader, Jikan client and per-title enrichment
//! - [`pipeline`] - The injectable recommendation service object
//! - [`ingest`] - Offline build of both indexes from the dataset
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod recommend;
pub mod search;
pub mod state;
