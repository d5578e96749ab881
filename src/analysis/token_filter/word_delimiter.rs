//! Word delimiter filter implementation.
//!
//! Splits a token into sub-words on every character that is not a letter or a
//! digit, and optionally on lower-to-upper case changes and letter/digit
//! boundaries. With `preserve_original` the unsplit token is emitted too, so
//! both `array foreach` and `array.prototype.foreach` find the same document.
//!
//! ```text
//! "Array.prototype.forEach"
//!     → "Array.prototype.forEach" (original, position 0)
//!     → "Array" (position 0) "prototype" (position 1) "forEach" (position 2)
//! ```
//!
//! Every split part records the delimiter that immediately followed it in the
//! [`TRAILING_DELIMITER`] attribute, and the part that starts the token carries
//! [`LEADING_PART`]. The elision filter uses both to recognise article
//! fragments such as the `l` split off `l'avion`.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;

use crate::analysis::token::{Token, TokenStream, TokenType};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Token attribute holding the delimiter character that followed a split part.
pub const TRAILING_DELIMITER: &str = "trailing_delimiter";

/// Token attribute marking the split part that starts at the beginning of its token.
pub const LEADING_PART: &str = "leading_part";

/// Options of the `word_delimiter` token filter, with the engine's defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordDelimiterConfig {
    /// Emit alphabetic sub-words.
    pub generate_word_parts: bool,
    /// Emit numeric sub-words.
    pub generate_number_parts: bool,
    /// Split `forEach` into `for` and `Each`.
    pub split_on_case_change: bool,
    /// Split `3D` into `3` and `D`.
    pub split_on_numerics: bool,
    /// Also emit the unsplit token when it was split.
    pub preserve_original: bool,
    /// Drop a trailing `'s` from the last sub-word.
    pub stem_english_possessive: bool,
}

impl Default for WordDelimiterConfig {
    fn default() -> Self {
        WordDelimiterConfig {
            generate_word_parts: true,
            generate_number_parts: true,
            split_on_case_change: true,
            split_on_numerics: true,
            preserve_original: false,
            stem_english_possessive: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
    Delimiter,
}

impl CharClass {
    fn of(ch: char) -> Self {
        if ch.is_numeric() {
            CharClass::Digit
        } else if ch.is_uppercase() {
            CharClass::Upper
        } else if ch.is_alphabetic() || is_combining_mark(ch) {
            CharClass::Lower
        } else {
            CharClass::Delimiter
        }
    }

    fn is_letter(self) -> bool {
        matches!(self, CharClass::Lower | CharClass::Upper)
    }
}

/// A sub-word found inside a token, as byte offsets into the token text.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Part {
    start: usize,
    end: usize,
    numeric: bool,
    trailing: Option<char>,
}

impl Part {
    fn new(text: &str, start: usize, end: usize, trailing: Option<char>) -> Self {
        Part {
            start,
            end,
            numeric: text[start..end].chars().all(char::is_numeric),
            trailing,
        }
    }
}

fn is_apostrophe(ch: char) -> bool {
    matches!(ch, '\'' | '\u{2019}')
}

/// A filter that splits tokens on intra-word delimiters.
///
/// # Examples
///
/// ```
/// use yari_search::analysis::token_filter::Filter;
/// use yari_search::analysis::token_filter::word_delimiter::{
///     WordDelimiterConfig, WordDelimiterFilter,
/// };
/// use yari_search::analysis::token::Token;
///
/// let filter = WordDelimiterFilter::new(WordDelimiterConfig {
///     preserve_original: true,
///     split_on_case_change: false,
///     split_on_numerics: false,
///     ..Default::default()
/// });
/// let tokens = vec![Token::with_offsets("Array.prototype.forEach", 0, 0, 23)];
/// let texts: Vec<_> = filter
///     .filter(Box::new(tokens.into_iter()))
///     .unwrap()
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(texts, vec!["Array.prototype.forEach", "Array", "prototype", "forEach"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct WordDelimiterFilter {
    config: WordDelimiterConfig,
}

impl WordDelimiterFilter {
    /// Create a new word delimiter filter.
    pub fn new(config: WordDelimiterConfig) -> Self {
        WordDelimiterFilter { config }
    }

    /// The filter's options.
    pub fn config(&self) -> &WordDelimiterConfig {
        &self.config
    }

    fn is_boundary(&self, prev: CharClass, cur: CharClass) -> bool {
        (self.config.split_on_case_change && prev == CharClass::Lower && cur == CharClass::Upper)
            || (self.config.split_on_numerics
                && ((prev.is_letter() && cur == CharClass::Digit)
                    || (prev == CharClass::Digit && cur.is_letter())))
    }

    fn split(&self, text: &str) -> Vec<Part> {
        let mut parts = Vec::new();
        let mut start: Option<usize> = None;
        let mut prev: Option<CharClass> = None;

        for (idx, ch) in text.char_indices() {
            let class = CharClass::of(ch);

            if class == CharClass::Delimiter {
                if let Some(s) = start.take() {
                    parts.push(Part::new(text, s, idx, Some(ch)));
                }
                prev = None;
                continue;
            }

            match (start, prev) {
                (Some(s), Some(p)) if self.is_boundary(p, class) => {
                    parts.push(Part::new(text, s, idx, None));
                    start = Some(idx);
                }
                (None, _) => start = Some(idx),
                _ => {}
            }
            prev = Some(class);
        }

        if let Some(s) = start {
            parts.push(Part::new(text, s, text.len(), None));
        }

        if self.config.stem_english_possessive {
            Self::strip_possessive(text, &mut parts);
        }

        parts
    }

    fn strip_possessive(text: &str, parts: &mut Vec<Part>) {
        let n = parts.len();
        if n < 2 {
            return;
        }

        let last = &parts[n - 1];
        let before = &parts[n - 2];
        let is_possessive = last.end == text.len()
            && text[last.start..last.end].eq_ignore_ascii_case("s")
            && before.trailing.is_some_and(is_apostrophe)
            && text[before.end..last.start].chars().count() == 1;

        if is_possessive {
            parts.pop();
            if let Some(before) = parts.last_mut() {
                before.trailing = None;
            }
        }
    }

    fn keeps(&self, part: &Part) -> bool {
        if part.numeric {
            self.config.generate_number_parts
        } else {
            self.config.generate_word_parts
        }
    }
}

impl Filter for WordDelimiterFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut output = Vec::new();
        // Extra positions introduced by earlier splits.
        let mut shift = 0;

        for mut token in tokens {
            if token.is_stopped() {
                token.position += shift;
                output.push(token);
                continue;
            }

            let parts = self.split(&token.text);
            let unsplit = matches!(
                parts.as_slice(),
                [only] if only.start == 0 && only.end == token.text.len()
            );
            if unsplit {
                token.position += shift;
                output.push(token);
                continue;
            }

            let kept: Vec<&Part> = parts.iter().filter(|p| self.keeps(p)).collect();
            let base = token.position + shift;

            let parts_follow_original = self.config.preserve_original;
            if parts_follow_original {
                let mut original = token.clone();
                original.position = base;
                output.push(original);
            }

            for (i, part) in kept.iter().enumerate() {
                let increment = match (i, parts_follow_original) {
                    (0, true) => 0,
                    (0, false) => token.position_increment,
                    _ => 1,
                };
                let token_type = if part.numeric {
                    TokenType::Num
                } else {
                    TokenType::Alphanum
                };

                let mut sub = Token::with_offsets(
                    &token.text[part.start..part.end],
                    base + i,
                    token.start_offset + part.start,
                    token.start_offset + part.end,
                )
                .with_position_increment(increment)
                .with_token_type(token_type)
                .with_original_text(token.text.clone());

                if let Some(delimiter) = part.trailing {
                    sub = sub.with_attribute(TRAILING_DELIMITER, delimiter.to_string());
                }
                if part.start == 0 {
                    sub = sub.with_attribute(LEADING_PART, "true");
                }
                output.push(sub);
            }

            shift += kept.len().saturating_sub(1);
        }

        Ok(Box::new(output.into_iter()))
    }

    fn name(&self) -> &'static str {
        "word_delimiter"
    }
}
