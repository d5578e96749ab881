//! Lowercase filter implementation.
//!
//! # Examples
//!
//! ```
//! use yari_search::analysis::token_filter::Filter;
//! use yari_search::analysis::token_filter::lowercase::LowercaseFilter;
//! use yari_search::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("WebGL", 0), Token::new("BÉZIER", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "webgl");
//! assert_eq!(filtered[1].text, "bézier");
//! ```

use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// A filter that converts tokens to lowercase using Unicode case mapping.
///
/// Stopped tokens are skipped; positions and offsets are preserved.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|mut token| {
                if !token.is_stopped() && token.text.chars().any(char::is_uppercase) {
                    token.text = token.text.to_lowercase();
                }
                token
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}
