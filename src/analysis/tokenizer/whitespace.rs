//! Whitespace tokenizer implementation.

use super::Tokenizer;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::error::Result;

/// A tokenizer that splits text on Unicode whitespace and nothing else.
///
/// Punctuation stays attached to the words, so `<video>` survives as a single
/// token. Useful when inspecting what a filter chain does to raw words.
///
/// # Examples
///
/// ```
/// use yari_search::analysis::tokenizer::Tokenizer;
/// use yari_search::analysis::tokenizer::whitespace::WhitespaceTokenizer;
///
/// let tokenizer = WhitespaceTokenizer::new();
/// let tokens: Vec<_> = tokenizer.tokenize("The <video> element").unwrap().collect();
/// assert_eq!(tokens[1].text, "<video>");
/// ```
#[derive(Clone, Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer.
    pub fn new() -> Self {
        WhitespaceTokenizer
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut word_start: Option<usize> = None;

        for (idx, ch) in text.char_indices() {
            match (ch.is_whitespace(), word_start) {
                (true, Some(start)) => {
                    let position = tokens.len();
                    tokens.push(
                        Token::with_offsets(&text[start..idx], position, start, idx)
                            .with_token_type(TokenType::Word),
                    );
                    word_start = None;
                }
                (false, None) => word_start = Some(idx),
                _ => {}
            }
        }

        if let Some(start) = word_start {
            let position = tokens.len();
            tokens.push(
                Token::with_offsets(&text[start..], position, start, text.len())
                    .with_token_type(TokenType::Word),
            );
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenizer() {
        let tokenizer = WhitespaceTokenizer::new();
        let tokens: Vec<Token> = tokenizer
            .tokenize("  hello\tworld\n  l'avion ")
            .unwrap()
            .collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "hello");
        assert_eq!(tokens[1].text, "world");
        assert_eq!(tokens[2].text, "l'avion");
        assert_eq!(tokens[2].position, 2);
        assert_eq!((tokens[0].start_offset, tokens[0].end_offset), (2, 7));
    }

    #[test]
    fn test_empty_input() {
        let tokens: Vec<Token> = WhitespaceTokenizer::new().tokenize("   ").unwrap().collect();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_tokenizer_name() {
        assert_eq!(WhitespaceTokenizer::new().name(), "whitespace");
    }
}
