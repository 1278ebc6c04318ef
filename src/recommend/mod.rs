//! Prompt construction and answer parsing for the recommendation step.

pub mod parser;
pub mod prompt;

pub use parser::parse;
pub use prompt::build_recommendation_prompt;
