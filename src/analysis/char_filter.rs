//! Char filters that rewrite raw text before tokenization.
//!
//! A char filter sees the whole input string, not tokens, so it is the only
//! place where multi-character markup like `<video>` can be turned into
//! something the tokenizer keeps. Every filter reports the spans it rewrote so
//! the pipeline can map token offsets back onto the original text.
//!
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement

/// Represents a change in the text, mapping a range in the original text
/// to a range in the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transformation {
    pub original_start: usize,
    pub original_end: usize,
    pub new_start: usize,
    pub new_end: usize,
}

impl Transformation {
    pub fn new(
        original_start: usize,
        original_end: usize,
        new_start: usize,
        new_end: usize,
    ) -> Self {
        Self {
            original_start,
            original_end,
            new_start,
            new_end,
        }
    }
}

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text.
    ///
    /// Returns the filtered text and the transformations, ordered by position,
    /// for every span whose length changed.
    fn filter(&self, input: &str) -> (String, Vec<Transformation>);

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod pattern_replace;
