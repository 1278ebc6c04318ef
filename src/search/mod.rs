pub mod bm25;
pub mod hybrid;
pub mod retriever;
pub mod vector;

pub use hybrid::{apply_budget, assemble, merge, ContextBudget};
pub use retriever::{DenseRetriever, Retriever, SparseRetriever};
