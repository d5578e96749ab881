//! Pattern replace char filter.
//!
//! Replacement strings use the search engine's syntax, where `$1` refers to the
//! first capture group and may be directly followed by word characters
//! (`_$1_`). They are translated to the `regex` crate's `${1}` form once, at
//! construction time.

use regex::Regex;

use super::{CharFilter, Transformation};
use crate::error::{DeployerError, Result};

/// A char filter that replaces every match of a regex pattern.
///
/// # Examples
///
/// ```
/// use yari_search::analysis::char_filter::CharFilter;
/// use yari_search::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
///
/// let filter = PatternReplaceCharFilter::new("<([a-z]+)>", "_$1_").unwrap();
/// let (output, _) = filter.filter("<video>: The Video Embed element");
/// assert_eq!(output, "_video_: The Video Embed element");
/// ```
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            DeployerError::analysis(format!("invalid pattern [{pattern}] for pattern_replace: {e}"))
        })?;
        Ok(Self {
            pattern,
            replacement: expand_group_references(replacement),
        })
    }

    /// The compiled pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Rewrite `$N` group references as `${N}` and `\$` as a literal dollar.
fn expand_group_references(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'$') => {
                chars.next();
                out.push_str("$$");
            }
            '$' if chars.peek().is_some_and(|c| c.is_ascii_digit()) => {
                out.push_str("${");
                while let Some(digit) = chars.next_if(|c| c.is_ascii_digit()) {
                    out.push(digit);
                }
                out.push('}');
            }
            '$' => out.push_str("$$"),
            _ => out.push(ch),
        }
    }

    out
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> (String, Vec<Transformation>) {
        let mut output = String::with_capacity(input.len());
        let mut transformations = Vec::new();
        let mut last_match_end = 0;

        for caps in self.pattern.captures_iter(input) {
            let Some(m) = caps.get(0) else { continue };

            output.push_str(&input[last_match_end..m.start()]);

            let replacement_start = output.len();
            caps.expand(&self.replacement, &mut output);
            let replacement_end = output.len();

            if m.end() - m.start() != replacement_end - replacement_start {
                transformations.push(Transformation::new(
                    m.start(),
                    m.end(),
                    replacement_start,
                    replacement_end,
                ));
            }

            last_match_end = m.end();
        }

        output.push_str(&input[last_match_end..]);

        (output, transformations)
    }

    fn name(&self) -> &'static str {
        "pattern_replace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names_wrapped_in_underscores() {
        let filter = PatternReplaceCharFilter::new("<([a-z]+)>", "_$1_").unwrap();
        let (output, transformations) = filter.filter("Use <a> inside <nav>, not <Video>");
        assert_eq!(output, "Use _a_ inside _nav_, not <Video>");
        // Same length replacements are not recorded.
        assert!(transformations.is_empty());
    }

    #[test]
    fn test_length_changing_replacement_is_recorded() {
        let filter = PatternReplaceCharFilter::new(r"(\d+)", "NUM").unwrap();
        let (output, transformations) = filter.filter("Year 2024");
        assert_eq!(output, "Year NUM");
        assert_eq!(transformations, vec![Transformation::new(5, 9, 5, 8)]);
    }

    #[test]
    fn test_group_reference_translation() {
        assert_eq!(expand_group_references("_$1_"), "_${1}_");
        assert_eq!(expand_group_references("$12x"), "${12}x");
        assert_eq!(expand_group_references(r"\$1"), "$$1");
        assert_eq!(expand_group_references("cost: $"), "cost: $$");
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PatternReplaceCharFilter::new("<([a-z]+>", "_$1_").unwrap_err();
        assert!(matches!(err, DeployerError::Analysis(_)));
    }
}
