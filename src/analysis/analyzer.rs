//! Analyzers: the full char filter → tokenizer → token filter pipeline.
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Filter 1 → … → Filter N → Tokens
//! ```
//!
//! The same analyzer must run at index time and at query time; a field that
//! names an analyzer in the mapping gets exactly this treatment on both sides.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// Analyzers are `Send + Sync` so one compiled instance can serve concurrent
/// indexing tasks.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// The analyzer's name, as referenced from field mappings.
    fn name(&self) -> &str;

    /// Analyze `text` and return the texts of the tokens that were not stopped.
    fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .analyze(text)?
            .filter(|token| !token.is_stopped())
            .map(|token| token.text)
            .collect())
    }
}

pub mod pipeline;
