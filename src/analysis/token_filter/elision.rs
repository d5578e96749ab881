//! Elision filter implementation.
//!
//! Removes a contracted leading article from a token: `l'avion` becomes
//! `avion`, `qu'il` becomes `il`. When a word delimiter filter ran earlier in
//! the chain, the article has also been emitted as a part of its own (`l`);
//! such parts are dropped here as well when they start the token
//! ([`LEADING_PART`]) and the apostrophe follows them ([`TRAILING_DELIMITER`]).
//! Article-like parts inside a token, like the `n` of `rock'n'roll`, are kept.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::analysis::token_filter::word_delimiter::{LEADING_PART, TRAILING_DELIMITER};
use crate::error::Result;

/// Articles removed by the built-in `elision` filter (French).
pub const DEFAULT_ARTICLES: &[&str] = &[
    "l", "m", "t", "qu", "n", "s", "j", "d", "c", "jusqu", "quoiqu", "lorsqu", "puisqu",
];

static DEFAULT_ARTICLES_SET: LazyLock<HashSet<String>> =
    LazyLock::new(|| DEFAULT_ARTICLES.iter().map(|&s| s.to_string()).collect());

const APOSTROPHES: [char; 2] = ['\'', '\u{2019}'];

/// A filter that strips elided articles.
///
/// # Examples
///
/// ```
/// use yari_search::analysis::token_filter::Filter;
/// use yari_search::analysis::token_filter::elision::ElisionFilter;
/// use yari_search::analysis::token::Token;
///
/// let filter = ElisionFilter::new();
/// let tokens = vec![Token::new("L'avion", 0), Token::new("d’accord", 1)];
/// let texts: Vec<_> = filter
///     .filter(Box::new(tokens.into_iter()))
///     .unwrap()
///     .map(|t| t.text)
///     .collect();
/// assert_eq!(texts, vec!["avion", "accord"]);
/// ```
#[derive(Clone, Debug)]
pub struct ElisionFilter {
    articles: Arc<HashSet<String>>,
    ignore_case: bool,
}

impl ElisionFilter {
    /// Create the built-in elision filter: French articles, case-insensitive.
    pub fn new() -> Self {
        ElisionFilter {
            articles: Arc::new(DEFAULT_ARTICLES_SET.clone()),
            ignore_case: true,
        }
    }

    /// Create an elision filter for a custom list of articles.
    ///
    /// Matching is case-sensitive unless `ignore_case` is set.
    pub fn from_articles<I, S>(articles: I, ignore_case: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let articles = articles
            .into_iter()
            .map(Into::into)
            .map(|a: String| if ignore_case { a.to_lowercase() } else { a })
            .collect();
        ElisionFilter {
            articles: Arc::new(articles),
            ignore_case,
        }
    }

    /// Check whether `word` is one of the configured articles.
    pub fn is_article(&self, word: &str) -> bool {
        if self.ignore_case {
            self.articles.contains(&word.to_lowercase())
        } else {
            self.articles.contains(word)
        }
    }

    /// The token text with a leading elided article removed, if it has one.
    fn strip<'a>(&self, text: &'a str) -> Option<&'a str> {
        let idx = text.find(APOSTROPHES)?;
        let (article, rest) = text.split_at(idx);
        if self.is_article(article) {
            rest.char_indices().nth(1).map(|(i, _)| &rest[i..]).or(Some(""))
        } else {
            None
        }
    }

    fn is_split_article(&self, token: &Token) -> bool {
        token.attribute(LEADING_PART).is_some()
            && token
                .attribute(TRAILING_DELIMITER)
                .and_then(|d| d.chars().next())
                .is_some_and(|d| APOSTROPHES.contains(&d))
            && self.is_article(&token.text)
    }
}

impl Default for ElisionFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for ElisionFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens: Vec<Token> = tokens
            .filter_map(|token| {
                if token.is_stopped() {
                    return Some(token);
                }
                if self.is_split_article(&token) {
                    return None;
                }
                match self.strip(&token.text) {
                    Some("") => None,
                    Some(rest) => Some(token.with_text(rest)),
                    None => Some(token),
                }
            })
            .collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "elision"
    }
}
