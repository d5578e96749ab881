//! Pipeline analyzer that combines char filters, a tokenizer and token filters.
//!
//! Processing order:
//! 1. Char filters rewrite the raw text, in the order they were added
//! 2. The tokenizer splits the filtered text
//! 3. Token filters run sequentially in the order they were added
//!
//! Token offsets always refer to the original, unfiltered text.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use yari_search::analysis::analyzer::Analyzer;
//! use yari_search::analysis::analyzer::pipeline::PipelineAnalyzer;
//! use yari_search::analysis::tokenizer::standard::StandardTokenizer;
//! use yari_search::analysis::token_filter::lowercase::LowercaseFilter;
//! use yari_search::analysis::token_filter::stop::StopFilter;
//!
//! let analyzer = PipelineAnalyzer::new(Arc::new(StandardTokenizer::new()))
//!     .add_filter(Arc::new(LowercaseFilter::new()))
//!     .add_filter(Arc::new(StopFilter::new()))
//!     .with_name("plain");
//!
//! let terms = analyzer.terms("The Video Embed element").unwrap();
//! assert_eq!(terms, vec!["video", "embed", "element"]);
//! assert_eq!(analyzer.name(), "plain");
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::char_filter::{CharFilter, Transformation};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A configurable analyzer that chains char filters, a tokenizer and filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    char_filters: Vec<Arc<dyn CharFilter>>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            char_filters: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Add a char filter to the pipeline.
    pub fn add_char_filter(mut self, char_filter: Arc<dyn CharFilter>) -> Self {
        self.char_filters.push(char_filter);
        self
    }

    /// Add a token filter to the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the name this analyzer is registered under.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Get the tokenizer used by this analyzer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the char filters used by this analyzer.
    pub fn char_filters(&self) -> &[Arc<dyn CharFilter>] {
        &self.char_filters
    }

    /// Get the token filters used by this analyzer.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }

    /// Map an offset in filtered text back to the text before one char filter ran.
    fn correct_offset(offset: usize, transformations: &[Transformation]) -> usize {
        let mut delta: isize = 0;

        for t in transformations {
            let new_len = t.new_end - t.new_start;
            let original_len = t.original_end - t.original_start;

            if offset >= t.new_end {
                delta += original_len as isize - new_len as isize;
            } else if offset >= t.new_start {
                // Inside a rewritten span: interpolate linearly.
                let offset_in_new = offset - t.new_start;
                return t.original_start + (offset_in_new * original_len) / new_len.max(1);
            } else {
                break;
            }
        }

        (offset as isize + delta) as usize
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut filtered_text = text.to_string();
        let mut filter_transformations = Vec::with_capacity(self.char_filters.len());

        for char_filter in &self.char_filters {
            let (new_text, transformations) = char_filter.filter(&filtered_text);
            filtered_text = new_text;
            filter_transformations.push(transformations);
        }

        let mut tokens = self.tokenizer.tokenize(&filtered_text)?;

        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }

        if filter_transformations.iter().all(Vec::is_empty) {
            return Ok(tokens);
        }

        let corrected: Vec<_> = tokens
            .map(|mut token| {
                // Final text → char filter N → … → char filter 1 → original text
                for transformations in filter_transformations.iter().rev() {
                    token.start_offset = Self::correct_offset(token.start_offset, transformations);
                    token.end_offset = Self::correct_offset(token.end_offset, transformations);
                }
                token
            })
            .collect();

        Ok(Box::new(corrected.into_iter()))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "char_filters",
                &self.char_filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
