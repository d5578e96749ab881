//! In-memory search engine.
//!
//! Indices live in a map behind a readers-writer lock. Analyzers are compiled
//! once, when the index is created, and every text field value is analyzed at
//! index time with the field's analyzer; queries go through the same analyzer,
//! so index-time and query-time analysis always agree.

use std::sync::Arc;

use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::error::{DeployerError, Result};
use crate::search::engine::{AnalyzedToken, MatchQuery, SearchEngine, SearchHit};
use crate::search::mapping::IndexMapping;
use crate::search::models::IndexDefinition;

#[derive(Debug)]
struct StoredDocument {
    source: Value,
    /// Analyzed terms per text field.
    terms: AHashMap<String, Vec<String>>,
}

#[derive(Debug)]
struct LocalIndex {
    definition: IndexDefinition,
    meta: Map<String, Value>,
    /// Compiled analyzers by analyzer name.
    analyzers: AHashMap<String, Arc<PipelineAnalyzer>>,
    documents: AHashMap<String, StoredDocument>,
}

impl LocalIndex {
    fn open(definition: &IndexDefinition) -> Result<Self> {
        let body = definition.to_json()?;
        let meta = match body.pointer("/mappings/_meta") {
            Some(Value::Object(meta)) => meta.clone(),
            _ => Map::new(),
        };

        let mut analyzers = AHashMap::new();
        let analyzer_names = definition
            .settings
            .analyzer
            .keys()
            .map(String::as_str)
            .chain(definition.mapping.fields().filter_map(|(_, f)| f.analyzer()));
        for name in analyzer_names {
            if analyzers.contains_key(name) {
                continue;
            }
            let analyzer = definition
                .settings
                .build_analyzer(name)
                .map_err(|e| match e {
                    DeployerError::Analysis(reason) => DeployerError::engine(400, reason),
                    other => other,
                })?;
            analyzers.insert(name.to_string(), Arc::new(analyzer));
        }

        Ok(LocalIndex {
            definition: definition.clone(),
            meta,
            analyzers,
            documents: AHashMap::new(),
        })
    }

    fn mapping(&self) -> &IndexMapping {
        &self.definition.mapping
    }

    fn analyzer(&self, name: &str) -> Result<Arc<PipelineAnalyzer>> {
        if let Some(analyzer) = self.analyzers.get(name) {
            return Ok(Arc::clone(analyzer));
        }
        // Built-ins are compiled on demand.
        self.definition
            .settings
            .build_analyzer(name)
            .map(Arc::new)
            .map_err(|e| DeployerError::engine(400, e.to_string()))
    }

    fn field_analyzer(&self, field: &str) -> Option<Arc<PipelineAnalyzer>> {
        let name = self.mapping().field(field)?.analyzer()?;
        self.analyzers.get(name).cloned()
    }

    fn analyze_source(&self, source: &Value) -> Result<AHashMap<String, Vec<String>>> {
        let mut terms = AHashMap::new();
        for field in self.mapping().text_fields() {
            let Some(analyzer) = self.field_analyzer(field) else {
                continue;
            };
            let field_terms = match source.get(field) {
                Some(Value::String(text)) => analyzer.terms(text)?,
                Some(Value::Array(values)) => {
                    let mut field_terms = Vec::new();
                    for text in values.iter().filter_map(Value::as_str) {
                        field_terms.extend(analyzer.terms(text)?);
                    }
                    field_terms
                }
                _ => continue,
            };
            terms.insert(field.to_string(), field_terms);
        }
        Ok(terms)
    }
}

/// An in-memory [`SearchEngine`].
///
/// # Examples
///
/// ```
/// use yari_search::search::engine::SearchEngine;
/// use yari_search::search::local::LocalEngine;
/// use yari_search::search::models::IndexDefinition;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// runtime.block_on(async {
///     let engine = LocalEngine::new();
///     engine.create_index(&IndexDefinition::mdn_docs()).await.unwrap();
///
///     let tokens = engine.analyze("mdn_docs", "text_analyzer", "l'avion").await.unwrap();
///     let texts: Vec<_> = tokens.iter().map(|t| t.token.as_str()).collect();
///     assert_eq!(texts, vec!["avion", "avion"]);
/// });
/// ```
#[derive(Debug, Default)]
pub struct LocalEngine {
    indices: RwLock<AHashMap<String, LocalIndex>>,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in an index.
    pub fn doc_count(&self, index: &str) -> Result<usize> {
        let indices = self.indices.read();
        let local = indices
            .get(index)
            .ok_or_else(|| DeployerError::IndexNotFound(index.to_string()))?;
        Ok(local.documents.len())
    }

    /// The stored source of a document.
    pub fn get_document(&self, index: &str, id: &str) -> Result<Option<Value>> {
        let indices = self.indices.read();
        let local = indices
            .get(index)
            .ok_or_else(|| DeployerError::IndexNotFound(index.to_string()))?;
        Ok(local.documents.get(id).map(|doc| doc.source.clone()))
    }
}

#[async_trait]
impl SearchEngine for LocalEngine {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn create_index(&self, definition: &IndexDefinition) -> Result<()> {
        // Compile before taking the lock.
        let local = LocalIndex::open(definition)?;

        let mut indices = self.indices.write();
        if indices.contains_key(&definition.name) {
            return Err(DeployerError::IndexExists(definition.name.clone()));
        }
        indices.insert(definition.name.clone(), local);
        tracing::debug!("Created local index {}", definition.name);
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        self.indices
            .write()
            .remove(index)
            .map(|_| ())
            .ok_or_else(|| DeployerError::IndexNotFound(index.to_string()))
    }

    async fn index_meta(&self, index: &str) -> Result<Map<String, Value>> {
        let indices = self.indices.read();
        indices
            .get(index)
            .map(|local| local.meta.clone())
            .ok_or_else(|| DeployerError::IndexNotFound(index.to_string()))
    }

    async fn analyze(&self, index: &str, analyzer: &str, text: &str) -> Result<Vec<AnalyzedToken>> {
        let analyzer = {
            let indices = self.indices.read();
            let local = indices
                .get(index)
                .ok_or_else(|| DeployerError::IndexNotFound(index.to_string()))?;
            local.analyzer(analyzer)?
        };
        Ok(analyzer.analyze(text)?.map(AnalyzedToken::from).collect())
    }

    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        source: &Value,
    ) -> Result<String> {
        let mut indices = self.indices.write();
        let local = indices
            .get_mut(index)
            .ok_or_else(|| DeployerError::IndexNotFound(index.to_string()))?;

        local.mapping().validate(source)?;
        let terms = local.analyze_source(source)?;

        let id = match id {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().simple().to_string(),
        };
        local.documents.insert(
            id.clone(),
            StoredDocument {
                source: source.clone(),
                terms,
            },
        );
        Ok(id)
    }

    async fn search(&self, index: &str, query: &MatchQuery) -> Result<Vec<SearchHit>> {
        let indices = self.indices.read();
        let local = indices
            .get(index)
            .ok_or_else(|| DeployerError::IndexNotFound(index.to_string()))?;

        let mut field_queries = Vec::with_capacity(query.fields.len());
        for field in &query.fields {
            if let Some(analyzer) = local.field_analyzer(field) {
                let mut terms = analyzer.terms(&query.query)?;
                terms.sort();
                terms.dedup();
                field_queries.push((field.as_str(), terms));
            }
        }

        let mut hits: Vec<(usize, f32, &str, &StoredDocument)> = local
            .documents
            .iter()
            .filter(|(_, doc)| match &query.locale {
                Some(locale) => doc.source.get("locale").and_then(Value::as_str) == Some(locale),
                None => true,
            })
            .filter_map(|(id, doc)| {
                let matched: usize = field_queries
                    .iter()
                    .map(|(field, terms)| {
                        let Some(doc_terms) = doc.terms.get(*field) else {
                            return 0;
                        };
                        terms.iter().filter(|t| doc_terms.contains(t)).count()
                    })
                    .sum();
                let popularity = doc
                    .source
                    .get("popularity")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0) as f32;
                (matched > 0).then_some((matched, popularity, id.as_str(), doc))
            })
            .collect();

        hits.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| b.1.total_cmp(&a.1))
                .then_with(|| a.2.cmp(&b.2))
        });

        Ok(hits
            .into_iter()
            .take(query.size)
            .map(|(matched, _, id, doc)| SearchHit {
                id: id.to_string(),
                score: Some(matched as f32),
                source: doc.source.clone(),
            })
            .collect())
    }
}
