//! ASCII folding filter implementation.
//!
//! Folds Latin letters with diacritics, ligatures and full-width forms to their
//! ASCII equivalents, so that `bézier` and `bezier` index the same term.
//! Characters outside the Latin and punctuation blocks are left alone; folding
//! Japanese kana through Unicode decomposition would change their meaning.

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Letters and punctuation that have no ASCII decomposition.
fn fold_special(ch: char) -> Option<&'static str> {
    Some(match ch {
        'æ' | 'ǣ' | 'ǽ' => "ae",
        'Æ' | 'Ǣ' | 'Ǽ' => "AE",
        'œ' => "oe",
        'Œ' => "OE",
        'ø' | 'ǿ' => "o",
        'Ø' | 'Ǿ' => "O",
        'ß' => "ss",
        'ẞ' => "SS",
        'ł' | 'ŀ' => "l",
        'Ł' | 'Ŀ' => "L",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'þ' => "th",
        'Þ' => "TH",
        'ħ' => "h",
        'Ħ' => "H",
        'ı' => "i",
        'ŋ' => "n",
        'Ŋ' => "N",
        'ŧ' => "t",
        'Ŧ' => "T",
        'ſ' => "s",
        'ĸ' => "q",
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => "\"",
        '\u{2010}'..='\u{2015}' => "-",
        '\u{2044}' => "/",
        _ => return None,
    })
}

/// Blocks whose compatibility decomposition yields the ASCII form we want.
fn is_foldable(ch: char) -> bool {
    matches!(ch,
        '\u{00A0}'..='\u{024F}' |
        '\u{1E00}'..='\u{1EFF}' |
        '\u{2C60}'..='\u{2C7F}' |
        '\u{A720}'..='\u{A7FF}' |
        '\u{2070}'..='\u{209F}' |
        '\u{FB00}'..='\u{FB06}' |
        '\u{FF01}'..='\u{FF5E}'
    )
}

/// Fold `text` to ASCII where an equivalent exists.
///
/// Returns the input unchanged (borrowed) when nothing needed folding.
///
/// ```
/// use yari_search::analysis::token_filter::ascii_folding::fold_to_ascii;
///
/// assert_eq!(fold_to_ascii("bézier"), "bezier");
/// assert_eq!(fold_to_ascii("Œuvre"), "OEuvre");
/// assert_eq!(fold_to_ascii("ｗｅｂ"), "web");
/// assert_eq!(fold_to_ascii("カタカナ"), "カタカナ");
/// ```
pub fn fold_to_ascii(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }

    let mut folded = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() {
            folded.push(ch);
        } else if let Some(replacement) = fold_special(ch) {
            folded.push_str(replacement);
        } else if is_foldable(ch) {
            // Decompositions can contain punctuation of their own (`½` gives U+2044).
            for c in std::iter::once(ch).nfkd().filter(|c| !is_combining_mark(*c)) {
                match fold_special(c) {
                    Some(replacement) => folded.push_str(replacement),
                    None => folded.push(c),
                }
            }
        } else if is_combining_mark(ch) {
            // Marks left over from decomposed input: drop them when they follow
            // an ASCII letter, keep them otherwise.
            if !folded.chars().last().is_some_and(|c| c.is_ascii_alphabetic()) {
                folded.push(ch);
            }
        } else {
            folded.push(ch);
        }
    }

    if folded == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(folded)
    }
}

/// A filter that folds non-ASCII Latin characters to ASCII.
///
/// With `preserve_original` the unfolded token is kept and the folded one is
/// emitted at the same position.
///
/// # Examples
///
/// ```
/// use yari_search::analysis::token_filter::Filter;
/// use yari_search::analysis::token_filter::ascii_folding::AsciiFoldingFilter;
/// use yari_search::analysis::token::Token;
///
/// let filter = AsciiFoldingFilter::new();
/// let tokens = vec![Token::new("bézier", 0)];
/// let result: Vec<_> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
/// assert_eq!(result[0].text, "bezier");
/// ```
#[derive(Clone, Debug, Default)]
pub struct AsciiFoldingFilter {
    preserve_original: bool,
}

impl AsciiFoldingFilter {
    /// Create a new ASCII folding filter.
    pub fn new() -> Self {
        AsciiFoldingFilter {
            preserve_original: false,
        }
    }

    /// Keep the original token next to the folded one.
    pub fn preserve_original(mut self, preserve_original: bool) -> Self {
        self.preserve_original = preserve_original;
        self
    }
}

impl Filter for AsciiFoldingFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut output = Vec::new();

        for token in tokens {
            if token.is_stopped() {
                output.push(token);
                continue;
            }

            let folded = match fold_to_ascii(&token.text) {
                Cow::Borrowed(_) => None,
                Cow::Owned(folded) => Some(folded),
            };
            let Some(folded) = folded else {
                output.push(token);
                continue;
            };

            if self.preserve_original {
                let folded_token: Token = token.with_text(folded).with_position_increment(0);
                output.push(token);
                output.push(folded_token);
            } else {
                output.push(token.with_text(folded));
            }
        }

        Ok(Box::new(output.into_iter()))
    }

    fn name(&self) -> &'static str {
        "asciifolding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("bézier"), "bezier");
        assert_eq!(fold_to_ascii("crème brûlée"), "creme brulee");
        assert_eq!(fold_to_ascii("straße"), "strasse");
        assert_eq!(fold_to_ascii("ﬁle"), "file");
        assert_eq!(fold_to_ascii("łódź"), "lodz");
        assert_eq!(fold_to_ascii("be\u{301}zier"), "bezier");
        assert_eq!(fold_to_ascii("한국어"), "한국어");
    }

    #[test]
    fn test_vulgar_fractions_fold_to_ascii() {
        assert_eq!(fold_to_ascii("½"), "1/2");
        assert_eq!(fold_to_ascii("¾ inch"), "3/4 inch");
        assert_eq!(fold_to_ascii("1\u{2044}2"), "1/2");
        assert!(fold_to_ascii("¼").is_ascii());
    }

    #[test]
    fn test_ascii_input_is_borrowed() {
        assert!(matches!(fold_to_ascii("bezier"), Cow::Borrowed(_)));
        assert!(matches!(fold_to_ascii("日本"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_folding_is_idempotent() {
        for word in ["bézier", "Œuvre", "ﬁle", "straße", "ｗｅｂ", "½"] {
            let once = fold_to_ascii(word).into_owned();
            assert_eq!(fold_to_ascii(&once), once);
        }
    }

    #[test]
    fn test_filter() {
        let filter = AsciiFoldingFilter::new();
        let tokens = vec![Token::new("bézier", 0), Token::new("curve", 1)];
        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "bezier");
        assert_eq!(result[1].text, "curve");
    }

    #[test]
    fn test_preserve_original() {
        let filter = AsciiFoldingFilter::new().preserve_original(true);
        let tokens = vec![Token::new("bézier", 0)];
        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "bézier");
        assert_eq!(result[1].text, "bezier");
        assert_eq!(result[1].position_increment, 0);
        assert_eq!(result[1].position, 0);
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(AsciiFoldingFilter::new().name(), "asciifolding");
    }
}
