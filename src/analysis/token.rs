//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows through the analysis pipeline: tokenizers
//! produce them, filters rewrite, split or drop them, and the engine indexes
//! whatever comes out of the last filter.
//!
//! # Examples
//!
//! ```
//! use yari_search::analysis::token::{Token, TokenType};
//!
//! let token = Token::with_offsets("WebGL", 0, 4, 9).with_token_type(TokenType::Alphanum);
//! assert_eq!(token.text, "WebGL");
//! assert_eq!(token.start_offset, 4);
//! assert_eq!(token.token_type(), Some(TokenType::Alphanum));
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of text produced by tokenization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Whether this token has been marked as stopped (removed) by a filter
    pub stopped: bool,

    /// Position increment from the previous token (default: 1).
    ///
    /// Split parts that share a position with the token they came from use 0.
    pub position_increment: usize,

    /// Additional metadata attached by tokenizers and filters
    pub metadata: Option<TokenMetadata>,
}

/// Token type classification, using the names the standard tokenizer reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// Letters, or letters mixed with digits
    #[serde(rename = "<ALPHANUM>")]
    Alphanum,
    /// Digits only
    #[serde(rename = "<NUM>")]
    Num,
    /// CJK ideographs
    #[serde(rename = "<IDEOGRAPHIC>")]
    Ideographic,
    /// Hiragana
    #[serde(rename = "<HIRAGANA>")]
    Hiragana,
    /// Katakana
    #[serde(rename = "<KATAKANA>")]
    Katakana,
    /// Hangul
    #[serde(rename = "<HANGUL>")]
    Hangul,
    /// A whole-input or whitespace-delimited word
    #[serde(rename = "word")]
    Word,
}

impl TokenType {
    /// The type name as reported by the engine's Analyze API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Alphanum => "<ALPHANUM>",
            TokenType::Num => "<NUM>",
            TokenType::Ideographic => "<IDEOGRAPHIC>",
            TokenType::Hiragana => "<HIRAGANA>",
            TokenType::Katakana => "<KATAKANA>",
            TokenType::Hangul => "<HANGUL>",
            TokenType::Word => "word",
        }
    }
}

/// Additional metadata that can be attached to tokens.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// The text of the token this one was derived from
    pub original_text: Option<String>,

    /// Token type classification
    pub token_type: Option<TokenType>,

    /// Additional custom attributes
    pub attributes: HashMap<String, String>,
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Self::with_offsets(text, position, 0, 0)
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            stopped: false,
            position_increment: 1,
            metadata: None,
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check if this token is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Set the original text in metadata.
    pub fn with_original_text<S: Into<String>>(mut self, original: S) -> Self {
        let metadata = self.metadata.get_or_insert_with(TokenMetadata::default);
        metadata.original_text = Some(original.into());
        self
    }

    /// Set the token type in metadata.
    pub fn with_token_type(mut self, token_type: TokenType) -> Self {
        let metadata = self.metadata.get_or_insert_with(TokenMetadata::default);
        metadata.token_type = Some(token_type);
        self
    }

    /// Set a custom attribute in metadata.
    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        let metadata = self.metadata.get_or_insert_with(TokenMetadata::default);
        metadata.attributes.insert(key.into(), value.into());
        self
    }

    /// Token type from metadata, if one was recorded.
    pub fn token_type(&self) -> Option<TokenType> {
        self.metadata.as_ref().and_then(|m| m.token_type)
    }

    /// Look up a custom attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.attributes.get(key))
            .map(String::as_str)
    }

    /// Clone this token with updated text.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }

    /// Set the position increment.
    pub fn with_position_increment(mut self, increment: usize) -> Self {
        self.position_increment = increment;
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hello", 0);
        assert_eq!(token.text, "hello");
        assert_eq!(token.position, 0);
        assert_eq!(token.position_increment, 1);
        assert!(!token.stopped);
        assert!(token.metadata.is_none());
    }

    #[test]
    fn test_token_metadata_builders() {
        let token = Token::new("forEach", 2)
            .with_original_text("Array.prototype.forEach")
            .with_token_type(TokenType::Alphanum)
            .with_attribute("trailing_delimiter", ".")
            .stop();

        assert!(token.is_stopped());
        assert_eq!(token.token_type(), Some(TokenType::Alphanum));
        assert_eq!(token.attribute("trailing_delimiter"), Some("."));
        assert_eq!(token.attribute("missing"), None);
        assert_eq!(
            token.metadata.unwrap().original_text.as_deref(),
            Some("Array.prototype.forEach")
        );
    }

    #[test]
    fn test_token_type_names() {
        assert_eq!(TokenType::Alphanum.as_str(), "<ALPHANUM>");
        assert_eq!(
            serde_json::to_string(&TokenType::Num).unwrap(),
            "\"<NUM>\""
        );
    }

    #[test]
    fn test_token_stream() {
        let tokens = vec![Token::new("hello", 0), Token::new("world", 1)];
        let stream: TokenStream = Box::new(tokens.into_iter());
        let collected: Vec<_> = stream.collect();

        assert_eq!(collected.len(), 2);
        assert_eq!(format!("{}", collected[1]), "world");
    }
}
