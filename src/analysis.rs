//! Text analysis for the documentation search index.
//!
//! This module provides tokenization, char filtering, token filtering and the
//! pipeline that chains them. [`settings::AnalysisSettings`] describes the
//! same pipelines as serializable index settings, so the analyzer the search
//! engine runs and the one built locally come from a single definition.

pub mod analyzer;
pub mod char_filter;
pub mod settings;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::Analyzer;
pub use analyzer::pipeline::PipelineAnalyzer;
pub use settings::AnalysisSettings;
pub use token::{Token, TokenStream, TokenType};
