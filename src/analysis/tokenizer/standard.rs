//! Standard tokenizer implementation.
//!
//! Splits text on Unicode word boundaries (UAX #29) and drops segments that
//! contain no letters or digits. Word-internal punctuation such as the dots in
//! `Array.prototype.forEach`, the apostrophe in `l'avion` and underscores are
//! kept inside the token, which is what lets the word delimiter filter see the
//! whole compound later in the chain.

use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// Longest token the engine's standard tokenizer emits before splitting.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 255;

/// A tokenizer that splits text on Unicode word boundaries.
///
/// # Examples
///
/// ```
/// use yari_search::analysis::tokenizer::Tokenizer;
/// use yari_search::analysis::tokenizer::standard::StandardTokenizer;
///
/// let tokenizer = StandardTokenizer::new();
/// let tokens: Vec<_> = tokenizer.tokenize("l'avion, 3D and <video>").unwrap().collect();
/// let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(texts, vec!["l'avion", "3D", "and", "video"]);
/// ```
#[derive(Clone, Debug)]
pub struct StandardTokenizer {
    max_token_length: usize,
}

impl StandardTokenizer {
    /// Create a new standard tokenizer.
    pub fn new() -> Self {
        StandardTokenizer {
            max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
        }
    }

    /// Set the maximum token length in characters. Longer words are split.
    pub fn with_max_token_length(mut self, max_token_length: usize) -> Self {
        self.max_token_length = max_token_length.max(1);
        self
    }

    /// Classify a word the way the standard tokenizer labels its tokens.
    fn detect_token_type(word: &str) -> TokenType {
        if word.chars().all(|c| c.is_numeric()) {
            return TokenType::Num;
        }

        if word
            .chars()
            .any(|c| matches!(c, '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}'))
        {
            return TokenType::Hangul;
        }

        if word.chars().all(|c| matches!(c, '\u{3040}'..='\u{309F}')) {
            return TokenType::Hiragana;
        }

        if word.chars().all(|c| matches!(c, '\u{30A0}'..='\u{30FF}')) {
            return TokenType::Katakana;
        }

        if word.chars().any(|c| {
            matches!(c,
                '\u{4E00}'..='\u{9FFF}' |
                '\u{3400}'..='\u{4DBF}' |
                '\u{20000}'..='\u{2A6DF}' |
                '\u{2A700}'..='\u{2CEAF}'
            )
        }) {
            return TokenType::Ideographic;
        }

        TokenType::Alphanum
    }

    /// Split `word` (starting at byte `start`) into chunks of at most
    /// `max_token_length` characters.
    fn chunks<'a>(&self, word: &'a str, start: usize) -> Vec<(usize, &'a str)> {
        if word.chars().count() <= self.max_token_length {
            return vec![(start, word)];
        }

        let mut chunks = Vec::new();
        let mut chunk_start = 0;
        for (count, (idx, _)) in word.char_indices().enumerate() {
            if count > 0 && count % self.max_token_length == 0 {
                chunks.push((start + chunk_start, &word[chunk_start..idx]));
                chunk_start = idx;
            }
        }
        chunks.push((start + chunk_start, &word[chunk_start..]));
        chunks
    }
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = text
            .split_word_bound_indices()
            .filter(|(_, word)| word.chars().any(|c| c.is_alphanumeric()))
            .flat_map(|(start, word)| self.chunks(word, start))
            .enumerate()
            .map(|(position, (start, word))| {
                Token::with_offsets(word, position, start, start + word.len())
                    .with_token_type(Self::detect_token_type(word))
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}
