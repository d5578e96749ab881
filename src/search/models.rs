//! The documentation index: its analysis pipeline and its field mapping.
//!
//! Changing anything here changes the analysis fingerprint. Existing indices
//! then refuse new documents until they are rebuilt with
//! [`SearchIndex::rebuild`](crate::search::SearchIndex::rebuild).

use serde_json::Value;

use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::settings::{
    AnalysisSettings, AnalyzerDefinition, CharFilterDefinition, TokenFilterDefinition,
};
use crate::analysis::token_filter::word_delimiter::WordDelimiterConfig;
use crate::error::Result;
use crate::search::mapping::{FieldMapping, IndexMapping};

/// Name of the documentation index.
pub const INDEX_NAME: &str = "mdn_docs";

/// Analyzer for every text field of the index.
pub const TEXT_ANALYZER: &str = "text_analyzer";

/// Word delimiter filter tuned for API names.
pub const YARI_WORD_DELIMITER: &str = "yari_word_delimiter";

/// Char filter that keeps HTML tag names searchable.
pub const KEEP_HTML_CHAR_FILTER: &str = "keep_html_char_filter";

/// `word_delimiter` options for documentation text.
///
/// `Array.prototype.forEach` is split into `Array`, `prototype` and `forEach`
/// while the whole name is kept, so both `array foreach` and the full path
/// match. Case changes and digit boundaries do not split: `WebGL` and `3D` stay
/// whole.
pub fn yari_word_delimiter() -> TokenFilterDefinition {
    TokenFilterDefinition::WordDelimiter(WordDelimiterConfig {
        preserve_original: true,
        split_on_case_change: false,
        split_on_numerics: false,
        ..WordDelimiterConfig::default()
    })
}

/// Rewrite `<video>` as `_video_` before tokenization.
///
/// The tokenizer would otherwise drop the brackets and `<a>` would be
/// indistinguishable from the stop word `a`. The word delimiter still emits
/// the bare `video` as well, so `<section>` also matches pages that only
/// mention "section".
pub fn keep_html_char_filter() -> CharFilterDefinition {
    CharFilterDefinition::PatternReplace {
        pattern: "<([a-z]+)>".to_string(),
        replacement: "_$1_".to_string(),
    }
}

/// The `text_analyzer` definition. Filter order is significant.
pub fn text_analyzer() -> AnalyzerDefinition {
    AnalyzerDefinition::custom("standard")
        .with_char_filters([KEEP_HTML_CHAR_FILTER])
        .with_filters([
            YARI_WORD_DELIMITER,
            "elision",
            "lowercase",
            "stop",
            "asciifolding",
        ])
}

/// The `analysis` settings of the documentation index.
pub fn analysis_settings() -> AnalysisSettings {
    AnalysisSettings::new()
        .with_char_filter(KEEP_HTML_CHAR_FILTER, keep_html_char_filter())
        .with_filter(YARI_WORD_DELIMITER, yari_word_delimiter())
        .with_analyzer(TEXT_ANALYZER, text_analyzer())
}

/// Compile `text_analyzer` for in-process use.
pub fn build_text_analyzer() -> Result<PipelineAnalyzer> {
    analysis_settings().build_analyzer(TEXT_ANALYZER)
}

/// Field mapping of a documentation page.
pub fn document_mapping() -> IndexMapping {
    IndexMapping::new()
        .with_required_field("title", FieldMapping::text(TEXT_ANALYZER))
        .with_field("body", FieldMapping::text(TEXT_ANALYZER))
        .with_field("summary", FieldMapping::text(TEXT_ANALYZER))
        .with_field("locale", FieldMapping::Keyword)
        .with_field("archived", FieldMapping::Boolean)
        .with_field("slug", FieldMapping::Keyword)
        .with_field("popularity", FieldMapping::Float)
}

/// Everything needed to create an index: name, analysis settings and mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexDefinition {
    pub name: String,
    pub settings: AnalysisSettings,
    pub mapping: IndexMapping,
}

impl IndexDefinition {
    /// Create a definition from parts.
    pub fn new<S: Into<String>>(
        name: S,
        settings: AnalysisSettings,
        mapping: IndexMapping,
    ) -> Self {
        IndexDefinition {
            name: name.into(),
            settings,
            mapping,
        }
    }

    /// The documentation index.
    pub fn mdn_docs() -> Self {
        Self::new(INDEX_NAME, analysis_settings(), document_mapping())
    }

    /// Fingerprint of the analysis settings.
    pub fn fingerprint(&self) -> Result<String> {
        self.settings.fingerprint()
    }

    /// The create-index request body, with the fingerprint recorded in `_meta`.
    pub fn to_json(&self) -> Result<Value> {
        let mappings = self
            .mapping
            .clone()
            .with_meta(IndexMapping::FINGERPRINT_META, self.fingerprint()?)
            .to_json()?;
        Ok(serde_json::json!({
            "settings": self.settings.to_index_settings()?,
            "mappings": mappings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::Analyzer;

    #[test]
    fn test_create_index_body() {
        let body = IndexDefinition::mdn_docs().to_json().unwrap();

        let analysis = &body["settings"]["analysis"];
        assert_eq!(analysis["analyzer"]["text_analyzer"]["tokenizer"], "standard");
        assert_eq!(
            analysis["analyzer"]["text_analyzer"]["filter"],
            serde_json::json!([
                "yari_word_delimiter",
                "elision",
                "lowercase",
                "stop",
                "asciifolding"
            ])
        );
        assert_eq!(
            analysis["analyzer"]["text_analyzer"]["char_filter"],
            serde_json::json!(["keep_html_char_filter"])
        );
        assert_eq!(analysis["filter"]["yari_word_delimiter"]["type"], "word_delimiter");
        assert_eq!(analysis["filter"]["yari_word_delimiter"]["preserve_original"], true);
        assert_eq!(analysis["filter"]["yari_word_delimiter"]["split_on_case_change"], false);
        assert_eq!(analysis["filter"]["yari_word_delimiter"]["split_on_numerics"], false);
        assert_eq!(analysis["char_filter"]["keep_html_char_filter"]["pattern"], "<([a-z]+)>");
        assert_eq!(analysis["char_filter"]["keep_html_char_filter"]["replacement"], "_$1_");

        let properties = &body["mappings"]["properties"];
        assert_eq!(properties["title"]["type"], "text");
        assert_eq!(properties["title"]["analyzer"], "text_analyzer");
        assert_eq!(properties["locale"]["type"], "keyword");
        assert_eq!(properties["archived"]["type"], "boolean");
        assert_eq!(properties["popularity"]["type"], "float");

        let fingerprint = IndexDefinition::mdn_docs().fingerprint().unwrap();
        assert_eq!(
            body["mappings"]["_meta"]["analysis_fingerprint"],
            fingerprint.as_str()
        );
    }

    #[test]
    fn test_text_analyzer_compiles() {
        let analyzer = build_text_analyzer().unwrap();
        assert_eq!(analyzer.name(), TEXT_ANALYZER);
        assert_eq!(analyzer.char_filters().len(), 1);
        assert_eq!(analyzer.filters().len(), 5);
        assert_eq!(analyzer.terms("<video>").unwrap(), vec!["_video_", "video"]);
    }

    #[test]
    fn test_document_mapping_fields() {
        let mapping = document_mapping();
        assert!(mapping.is_required("title"));
        assert!(!mapping.is_required("body"));
        assert_eq!(mapping.text_fields().collect::<Vec<_>>(), vec!["body", "summary", "title"]);
    }
}
