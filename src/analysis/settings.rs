//! Serializable analysis settings.
//!
//! [`AnalysisSettings`] is the `analysis` block of an index's settings: named
//! analyzers, token filters and char filters, in the JSON shape the search
//! engine accepts. The same value compiles into [`PipelineAnalyzer`]s for
//! in-process analysis, and its [`fingerprint`](AnalysisSettings::fingerprint)
//! identifies the exact pipeline an index was created with.
//!
//! # Examples
//!
//! ```
//! use yari_search::analysis::analyzer::Analyzer;
//! use yari_search::analysis::settings::{AnalysisSettings, AnalyzerDefinition};
//!
//! let settings = AnalysisSettings::new().with_analyzer(
//!     "plain",
//!     AnalyzerDefinition::custom("standard").with_filters(["lowercase", "asciifolding"]),
//! );
//!
//! let analyzer = settings.build_analyzer("plain").unwrap();
//! assert_eq!(analyzer.terms("Bézier Curves").unwrap(), vec!["bezier", "curves"]);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::CharFilter;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::token_filter::Filter;
use crate::analysis::token_filter::ascii_folding::AsciiFoldingFilter;
use crate::analysis::token_filter::elision::{DEFAULT_ARTICLES, ElisionFilter};
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::stop::{ENGLISH_STOP_WORDS_SET, StopFilter};
use crate::analysis::token_filter::word_delimiter::{WordDelimiterConfig, WordDelimiterFilter};
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::standard::StandardTokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::error::{DeployerError, Result};

/// Analyzers available without a definition.
pub const BUILTIN_ANALYZERS: &[&str] = &["standard", "whitespace"];

/// Token filters available without a definition.
pub const BUILTIN_FILTERS: &[&str] = &["lowercase", "stop", "elision", "asciifolding"];

/// A named analyzer definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalyzerDefinition {
    /// A tokenizer plus ordered char filters and token filters.
    Custom {
        tokenizer: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        char_filter: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        filter: Vec<String>,
    },
}

impl AnalyzerDefinition {
    /// Start a custom analyzer on the named tokenizer.
    pub fn custom<S: Into<String>>(tokenizer: S) -> Self {
        AnalyzerDefinition::Custom {
            tokenizer: tokenizer.into(),
            char_filter: Vec::new(),
            filter: Vec::new(),
        }
    }

    /// Set the token filters, in application order.
    pub fn with_filters<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let AnalyzerDefinition::Custom {
            tokenizer,
            char_filter,
            ..
        } = self;
        AnalyzerDefinition::Custom {
            tokenizer,
            char_filter,
            filter: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the char filters, in application order.
    pub fn with_char_filters<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let AnalyzerDefinition::Custom {
            tokenizer, filter, ..
        } = self;
        AnalyzerDefinition::Custom {
            tokenizer,
            char_filter: names.into_iter().map(Into::into).collect(),
            filter,
        }
    }
}

/// Stop word list of a `stop` filter: a predefined list name or explicit words.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopWords {
    /// `_english_` or `_none_`.
    Named(String),
    List(Vec<String>),
}

impl Default for StopWords {
    fn default() -> Self {
        StopWords::Named("_english_".to_string())
    }
}

/// A named token filter definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenFilterDefinition {
    WordDelimiter(WordDelimiterConfig),
    Elision {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        articles: Option<Vec<String>>,
        #[serde(default)]
        articles_case: bool,
    },
    Stop {
        #[serde(default)]
        stopwords: StopWords,
        #[serde(default)]
        ignore_case: bool,
    },
    Lowercase,
    Asciifolding {
        #[serde(default)]
        preserve_original: bool,
    },
}

impl TokenFilterDefinition {
    fn build(&self, name: &str) -> Result<Arc<dyn Filter>> {
        let filter: Arc<dyn Filter> = match self {
            TokenFilterDefinition::WordDelimiter(config) => {
                Arc::new(WordDelimiterFilter::new(config.clone()))
            }
            TokenFilterDefinition::Elision {
                articles,
                articles_case,
            } => match articles {
                Some(articles) => Arc::new(ElisionFilter::from_articles(
                    articles.iter().cloned(),
                    *articles_case,
                )),
                None => Arc::new(ElisionFilter::from_articles(
                    DEFAULT_ARTICLES.iter().copied(),
                    *articles_case,
                )),
            },
            TokenFilterDefinition::Stop {
                stopwords,
                ignore_case,
            } => {
                let filter = match stopwords {
                    StopWords::Named(list) if list == "_english_" => {
                        StopFilter::with_stop_words(ENGLISH_STOP_WORDS_SET.clone())
                    }
                    StopWords::Named(list) if list == "_none_" => {
                        StopFilter::from_words(Vec::<String>::new())
                    }
                    StopWords::Named(list) => {
                        return Err(DeployerError::analysis(format!(
                            "unknown stop words list [{list}] for filter [{name}]"
                        )));
                    }
                    StopWords::List(words) => StopFilter::from_words(words.iter().cloned()),
                };
                Arc::new(filter.ignore_case(*ignore_case))
            }
            TokenFilterDefinition::Lowercase => Arc::new(LowercaseFilter::new()),
            TokenFilterDefinition::Asciifolding { preserve_original } => {
                Arc::new(AsciiFoldingFilter::new().preserve_original(*preserve_original))
            }
        };
        Ok(filter)
    }
}

/// A named char filter definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CharFilterDefinition {
    PatternReplace { pattern: String, replacement: String },
}

impl CharFilterDefinition {
    fn build(&self) -> Result<Arc<dyn CharFilter>> {
        match self {
            CharFilterDefinition::PatternReplace {
                pattern,
                replacement,
            } => Ok(Arc::new(PatternReplaceCharFilter::new(pattern, replacement)?)),
        }
    }
}

/// The `analysis` block of an index's settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub analyzer: BTreeMap<String, AnalyzerDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filter: BTreeMap<String, TokenFilterDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub char_filter: BTreeMap<String, CharFilterDefinition>,
}

impl AnalysisSettings {
    /// Create empty settings; only the built-ins are available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an analyzer.
    pub fn with_analyzer<S: Into<String>>(
        mut self,
        name: S,
        definition: AnalyzerDefinition,
    ) -> Self {
        self.analyzer.insert(name.into(), definition);
        self
    }

    /// Register a token filter.
    pub fn with_filter<S: Into<String>>(
        mut self,
        name: S,
        definition: TokenFilterDefinition,
    ) -> Self {
        self.filter.insert(name.into(), definition);
        self
    }

    /// Register a char filter.
    pub fn with_char_filter<S: Into<String>>(
        mut self,
        name: S,
        definition: CharFilterDefinition,
    ) -> Self {
        self.char_filter.insert(name.into(), definition);
        self
    }

    /// Render as index settings: `{"analysis": {...}}`.
    pub fn to_index_settings(&self) -> Result<Value> {
        Ok(json!({ "analysis": serde_json::to_value(self)? }))
    }

    /// Read the `analysis` block back from index settings.
    ///
    /// Accepts both `{"analysis": ...}` and `{"index": {"analysis": ...}}`.
    pub fn from_index_settings(settings: &Value) -> Result<Self> {
        let analysis = settings
            .get("analysis")
            .or_else(|| settings.pointer("/index/analysis"))
            .cloned()
            .unwrap_or(Value::Object(Default::default()));
        Ok(serde_json::from_value(analysis)?)
    }

    /// CRC32 of the canonical JSON rendering, as eight hex digits.
    ///
    /// Maps are ordered, so equal settings always produce the same fingerprint.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(format!("{:08x}", crc32fast::hash(&bytes)))
    }

    /// Check that every defined analyzer compiles.
    pub fn validate(&self) -> Result<()> {
        for name in self.analyzer.keys() {
            self.build_analyzer(name)?;
        }
        Ok(())
    }

    /// Whether `name` resolves to an analyzer.
    pub fn has_analyzer(&self, name: &str) -> bool {
        self.analyzer.contains_key(name) || BUILTIN_ANALYZERS.contains(&name)
    }

    /// Compile the named analyzer.
    ///
    /// Defined analyzers shadow built-ins of the same name.
    pub fn build_analyzer(&self, name: &str) -> Result<PipelineAnalyzer> {
        if let Some(AnalyzerDefinition::Custom {
            tokenizer,
            char_filter,
            filter,
        }) = self.analyzer.get(name)
        {
            let mut analyzer = PipelineAnalyzer::new(build_tokenizer(tokenizer)?);
            for char_filter_name in char_filter {
                analyzer = analyzer.add_char_filter(self.build_char_filter(char_filter_name)?);
            }
            for filter_name in filter {
                analyzer = analyzer.add_filter(self.build_filter(filter_name)?);
            }
            return Ok(analyzer.with_name(name));
        }

        match name {
            "standard" => Ok(PipelineAnalyzer::new(Arc::new(StandardTokenizer::new()))
                .add_filter(Arc::new(LowercaseFilter::new()))
                .with_name(name)),
            "whitespace" => {
                Ok(PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new())).with_name(name))
            }
            _ => Err(DeployerError::analysis(format!(
                "failed to find analyzer [{name}]"
            ))),
        }
    }

    /// Compile the named token filter.
    pub fn build_filter(&self, name: &str) -> Result<Arc<dyn Filter>> {
        if let Some(definition) = self.filter.get(name) {
            return definition.build(name);
        }

        match name {
            "lowercase" => Ok(Arc::new(LowercaseFilter::new())),
            "stop" => Ok(Arc::new(StopFilter::new())),
            "elision" => Ok(Arc::new(ElisionFilter::new())),
            "asciifolding" => Ok(Arc::new(AsciiFoldingFilter::new())),
            _ => Err(DeployerError::analysis(format!(
                "failed to find filter under name [{name}]"
            ))),
        }
    }

    /// Compile the named char filter.
    pub fn build_char_filter(&self, name: &str) -> Result<Arc<dyn CharFilter>> {
        match self.char_filter.get(name) {
            Some(definition) => definition.build(),
            None => Err(DeployerError::analysis(format!(
                "failed to find char_filter under name [{name}]"
            ))),
        }
    }
}

fn build_tokenizer(name: &str) -> Result<Arc<dyn Tokenizer>> {
    match name {
        "standard" => Ok(Arc::new(StandardTokenizer::new())),
        "whitespace" => Ok(Arc::new(WhitespaceTokenizer::new())),
        _ => Err(DeployerError::analysis(format!(
            "failed to find tokenizer under name [{name}]"
        ))),
    }
}
