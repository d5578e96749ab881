//! Token filters that rewrite, split or drop tokens after tokenization.
//!
//! # Available Filters
//!
//! - [`word_delimiter::WordDelimiterFilter`] - Splits compound tokens on delimiters
//! - [`elision::ElisionFilter`] - Strips elided articles (`l'avion` → `avion`)
//! - [`lowercase::LowercaseFilter`] - Converts tokens to lowercase
//! - [`stop::StopFilter`] - Removes stop words
//! - [`ascii_folding::AsciiFoldingFilter`] - Folds accented letters to ASCII
//!
//! # Filter Chaining
//!
//! Filters run in the order the analyzer lists them, and the order matters:
//!
//! ```text
//! Tokenizer → Word Delimiter → Elision → Lowercase → Stop → ASCII Folding
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// Filters receive a stream of tokens and produce a new stream. Tokens that an
/// earlier filter marked as stopped are passed through untouched.
///
/// # Examples
///
/// Implementing a custom filter:
///
/// ```
/// use yari_search::analysis::token::{Token, TokenStream};
/// use yari_search::analysis::token_filter::Filter;
/// use yari_search::error::Result;
///
/// struct ReverseFilter;
///
/// impl Filter for ReverseFilter {
///     fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
///         let reversed: Vec<Token> = tokens
///             .map(|mut t| {
///                 t.text = t.text.chars().rev().collect();
///                 t
///             })
///             .collect();
///         Ok(Box::new(reversed.into_iter()))
///     }
///
///     fn name(&self) -> &'static str {
///         "reverse"
///     }
/// }
/// ```
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter, as used in analysis settings.
    fn name(&self) -> &'static str;
}

pub mod ascii_folding;
pub mod elision;
pub mod lowercase;
pub mod stop;
pub mod word_delimiter;
