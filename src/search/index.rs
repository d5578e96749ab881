//! Handle on the documentation index.
//!
//! [`SearchIndex`] ties an [`IndexDefinition`] to a [`SearchEngine`]. It makes
//! sure the index exists with the current analysis settings before anything is
//! written to it: an index created from a different pipeline is reported as
//! [`DeployerError::ReindexRequired`] rather than silently mixing documents
//! analyzed two different ways.

use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::error::{DeployerError, Result};
use crate::search::document::Document;
use crate::search::engine::{AnalyzedToken, MatchQuery, SearchEngine, SearchHit};
use crate::search::mapping::IndexMapping;
use crate::search::models::{IndexDefinition, TEXT_ANALYZER};

/// What [`SearchIndex::ensure`] found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// The index did not exist and was created.
    Created,
    /// The index exists with the current analysis settings.
    UpToDate,
}

/// The documentation index on a particular engine.
pub struct SearchIndex {
    engine: Arc<dyn SearchEngine>,
    definition: IndexDefinition,
    fingerprint: String,
    verified: OnceCell<()>,
}

impl SearchIndex {
    /// The `mdn_docs` index on `engine`.
    pub fn new(engine: Arc<dyn SearchEngine>) -> Result<Self> {
        Self::with_definition(engine, IndexDefinition::mdn_docs())
    }

    /// Any index definition on `engine`.
    pub fn with_definition(
        engine: Arc<dyn SearchEngine>,
        definition: IndexDefinition,
    ) -> Result<Self> {
        let fingerprint = definition.fingerprint()?;
        Ok(SearchIndex {
            engine,
            definition,
            fingerprint,
            verified: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &IndexDefinition {
        &self.definition
    }

    /// Fingerprint of the analysis settings this handle creates indices with.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Create the index if it is missing, otherwise check its analysis settings.
    pub async fn ensure(&self) -> Result<EnsureOutcome> {
        match self.engine.index_meta(self.name()).await {
            Ok(meta) => {
                self.check_fingerprint(&meta)?;
                Ok(EnsureOutcome::UpToDate)
            }
            Err(DeployerError::IndexNotFound(_)) => match self.create().await {
                Ok(()) => Ok(EnsureOutcome::Created),
                // Someone else created it in the meantime.
                Err(DeployerError::IndexExists(_)) => {
                    let meta = self.engine.index_meta(self.name()).await?;
                    self.check_fingerprint(&meta)?;
                    Ok(EnsureOutcome::UpToDate)
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Delete the index, if present, and create it from the current definition.
    ///
    /// All documents are gone afterwards and have to be indexed again.
    pub async fn rebuild(&self) -> Result<()> {
        tracing::info!(
            "Rebuilding index {} on {} (analysis fingerprint {})",
            self.name(),
            self.engine.name(),
            self.fingerprint
        );
        match self.engine.delete_index(self.name()).await {
            Ok(()) | Err(DeployerError::IndexNotFound(_)) => {}
            Err(e) => return Err(e),
        }
        self.create().await
    }

    /// Run `text_analyzer` of the index over `text`.
    pub async fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>> {
        self.analyze_with(TEXT_ANALYZER, text).await
    }

    /// Run any analyzer known to the index over `text`.
    pub async fn analyze_with(&self, analyzer: &str, text: &str) -> Result<Vec<AnalyzedToken>> {
        self.engine.analyze(self.name(), analyzer, text).await
    }

    /// Index one document, returning its id.
    pub async fn index_document(&self, doc: &Document) -> Result<String> {
        self.verify().await?;
        self.write(doc).await
    }

    /// Index many documents with at most `concurrency` requests in flight.
    ///
    /// The outer error is for the index as a whole (missing, stale settings);
    /// per-document failures are returned in input order and do not stop the
    /// remaining documents.
    pub async fn index_documents(
        &self,
        docs: &[Document],
        concurrency: usize,
    ) -> Result<Vec<Result<String>>> {
        self.verify().await?;

        let results: Vec<Result<String>> = stream::iter(docs)
            .map(|doc| self.write(doc))
            .buffered(concurrency.max(1))
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            tracing::warn!(
                "{} of {} documents failed to index into {}",
                failed,
                docs.len(),
                self.name()
            );
        } else {
            tracing::info!("Indexed {} documents into {}", docs.len(), self.name());
        }
        Ok(results)
    }

    /// Match `query` against title, summary and body.
    pub async fn search(
        &self,
        query: &str,
        locale: Option<&str>,
        size: usize,
    ) -> Result<Vec<SearchHit>> {
        let mut request = MatchQuery::new(query, &["title", "summary", "body"]).with_size(size);
        if let Some(locale) = locale {
            request = request.with_locale(locale);
        }
        self.engine.search(self.name(), &request).await
    }

    async fn create(&self) -> Result<()> {
        tracing::info!(
            "Creating index {} on {} (analysis fingerprint {})",
            self.name(),
            self.engine.name(),
            self.fingerprint
        );
        self.engine.create_index(&self.definition).await
    }

    /// Check the existing index once per handle.
    async fn verify(&self) -> Result<()> {
        self.verified
            .get_or_try_init(|| async {
                let meta = self.engine.index_meta(self.name()).await?;
                self.check_fingerprint(&meta)
            })
            .await?;
        Ok(())
    }

    fn check_fingerprint(&self, meta: &serde_json::Map<String, Value>) -> Result<()> {
        let found = meta
            .get(IndexMapping::FINGERPRINT_META)
            .and_then(Value::as_str);
        if found == Some(self.fingerprint.as_str()) {
            return Ok(());
        }

        let found = found.unwrap_or("none").to_string();
        tracing::warn!(
            "Index {} has analysis fingerprint {}, expected {}",
            self.name(),
            found,
            self.fingerprint
        );
        Err(DeployerError::ReindexRequired {
            index: self.name().to_string(),
            expected: self.fingerprint.clone(),
            found,
        })
    }

    async fn write(&self, doc: &Document) -> Result<String> {
        let source = doc.to_source()?;
        // The engine has no notion of required fields.
        self.definition.mapping.validate(&source)?;

        let id = doc.doc_id();
        let result = self
            .engine
            .index_document(self.name(), id.as_deref(), &source)
            .await;
        match &result {
            Ok(id) => tracing::debug!("Indexed {} into {}", id, self.name()),
            Err(e) => {
                tracing::debug!("Failed to index {:?} into {}: {}", doc.title, self.name(), e)
            }
        }
        result
    }
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("name", &self.definition.name)
            .field("engine", &self.engine.name())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}
