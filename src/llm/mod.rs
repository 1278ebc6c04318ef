pub mod embeddings;
pub mod generate;
pub mod retry;

pub use generate::{AnswerGenerator, ChatGenerator};
pub use retry::{with_retry, RetryPolicy};
