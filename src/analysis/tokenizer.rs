//! Tokenizers that split raw text into tokens.
//!
//! Tokenizers run after char filters and before token filters. Two are available:
//!
//! - [`standard::StandardTokenizer`] - Unicode word boundaries (UAX #29), the
//!   `standard` tokenizer of the search engine
//! - [`whitespace::WhitespaceTokenizer`] - Splits on whitespace only
//!
//! # Examples
//!
//! ```
//! use yari_search::analysis::tokenizer::Tokenizer;
//! use yari_search::analysis::tokenizer::standard::StandardTokenizer;
//!
//! let tokenizer = StandardTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Array.prototype.forEach()").unwrap().collect();
//! assert_eq!(tokens.len(), 1);
//! assert_eq!(tokens[0].text, "Array.prototype.forEach");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// Implementations must be `Send + Sync` so a compiled analyzer can be shared
/// between concurrent indexing tasks.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer, as used in analysis settings.
    fn name(&self) -> &'static str;
}

pub mod standard;
pub mod whitespace;
