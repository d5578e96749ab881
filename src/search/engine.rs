//! The seam between the index handle and a search engine.
//!
//! [`SearchEngine`] covers the handful of engine APIs the deployer needs:
//! index lifecycle, the Analyze API, single-document indexing and a match
//! query. Two implementations exist:
//!
//! - [`LocalEngine`](crate::search::local::LocalEngine) - in-memory, runs the
//!   analysis pipeline in-process
//! - [`ElasticsearchEngine`](crate::search::elasticsearch::ElasticsearchEngine) -
//!   HTTP client for a remote cluster

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::analysis::token::Token;
use crate::error::Result;
use crate::search::models::IndexDefinition;

/// One token as reported by the Analyze API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedToken {
    pub token: String,
    pub start_offset: usize,
    pub end_offset: usize,
    #[serde(rename = "type")]
    pub token_type: String,
    pub position: usize,
}

impl From<Token> for AnalyzedToken {
    fn from(token: Token) -> Self {
        let token_type = token
            .token_type()
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| "word".to_string());
        AnalyzedToken {
            token: token.text,
            start_offset: token.start_offset,
            end_offset: token.end_offset,
            token_type,
            position: token.position,
        }
    }
}

/// A full-text match over some fields, with an optional locale filter.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchQuery {
    pub query: String,
    pub fields: Vec<String>,
    pub locale: Option<String>,
    pub size: usize,
}

impl MatchQuery {
    /// Match `query` against the given fields, ten hits.
    pub fn new<S: Into<String>>(query: S, fields: &[&str]) -> Self {
        MatchQuery {
            query: query.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            locale: None,
            size: 10,
        }
    }

    pub fn with_locale<S: Into<String>>(mut self, locale: S) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// The `_search` request body.
    pub fn to_json(&self) -> Value {
        let must = json!({
            "multi_match": {
                "query": self.query,
                "fields": self.fields,
                "operator": "or",
            }
        });
        let filter: Vec<Value> = self
            .locale
            .iter()
            .map(|locale| json!({ "term": { "locale": locale } }))
            .collect();
        json!({
            "size": self.size,
            "query": { "bool": { "must": [must], "filter": filter } },
        })
    }
}

/// A search result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f32>,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// Operations a search engine has to provide.
///
/// Engine-reported errors are returned with the engine's reason unmodified.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &'static str;

    /// Create an index. Fails with `IndexExists` if it is already there.
    async fn create_index(&self, definition: &IndexDefinition) -> Result<()>;

    /// Delete an index. Fails with `IndexNotFound` if it does not exist.
    async fn delete_index(&self, index: &str) -> Result<()>;

    /// The `_meta` object of the index mapping (empty when none was set).
    async fn index_meta(&self, index: &str) -> Result<Map<String, Value>>;

    /// Run the named analyzer of an index over `text`.
    async fn analyze(&self, index: &str, analyzer: &str, text: &str) -> Result<Vec<AnalyzedToken>>;

    /// Index (or fully replace) a document and return its id.
    ///
    /// Without an id the engine assigns one.
    async fn index_document(&self, index: &str, id: Option<&str>, source: &Value)
    -> Result<String>;

    /// Run a match query.
    async fn search(&self, index: &str, query: &MatchQuery) -> Result<Vec<SearchHit>>;
}
