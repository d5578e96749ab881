//! Elasticsearch over HTTP.
//!
//! Error bodies are mapped onto [`DeployerError`] without rewriting the
//! engine's reason. Connection failures and timeouts become
//! [`DeployerError::Unavailable`], everything the cluster itself rejects
//! becomes [`DeployerError::Engine`] (or one of the index lifecycle variants).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::config::DeployerConfig;
use crate::error::{DeployerError, Result};
use crate::search::engine::{AnalyzedToken, MatchQuery, SearchEngine, SearchHit};
use crate::search::models::IndexDefinition;

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    tokens: Vec<AnalyzedToken>,
}

#[derive(Debug, Deserialize)]
struct IndexResponse {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    hits: Vec<SearchHit>,
}

/// A [`SearchEngine`] backed by an Elasticsearch cluster.
#[derive(Clone, Debug)]
pub struct ElasticsearchEngine {
    client: Client,
    base_url: Url,
}

impl ElasticsearchEngine {
    /// Connect to the cluster at `url`; every request is bounded by `timeout`.
    ///
    /// No request is made here.
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(url)
            .map_err(|e| DeployerError::config(format!("invalid Elasticsearch URL {url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DeployerError::config(format!(
                "invalid Elasticsearch URL {url}: not a base URL"
            )));
        }

        tracing::info!("Creating Elasticsearch client for {}", base_url);
        let client = Client::builder().timeout(timeout).build()?;

        Ok(ElasticsearchEngine { client, base_url })
    }

    /// Build from `DEPLOYER_ELASTICSEARCH_URL` and `DEPLOYER_ELASTICSEARCH_TIMEOUT`.
    pub fn from_config(config: &DeployerConfig) -> Result<Self> {
        let url = config.elasticsearch_url.as_deref().ok_or_else(|| {
            DeployerError::config("DEPLOYER_ELASTICSEARCH_URL is not set")
        })?;
        Self::new(url, config.elasticsearch_timeout())
    }

    /// The cluster URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DeployerError::config(format!("invalid Elasticsearch URL {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<Response> {
        let url = self.url(segments)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }
}

/// Turn a non-success response into an error, keeping the engine's reason.
async fn error_for(response: Response, index: &str) -> DeployerError {
    let status = response.status();
    let body: Value = match response.text().await {
        Ok(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        Err(e) => return e.into(),
    };

    let error_type = body
        .pointer("/error/type")
        .and_then(Value::as_str)
        .unwrap_or("");
    match error_type {
        "resource_already_exists_exception" => return DeployerError::IndexExists(index.to_string()),
        "index_not_found_exception" => return DeployerError::IndexNotFound(index.to_string()),
        _ => {}
    }
    if status == StatusCode::NOT_FOUND && body.get("error").is_none() {
        return DeployerError::IndexNotFound(index.to_string());
    }

    let reason = body
        .pointer("/error/reason")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| body.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    DeployerError::engine(status.as_u16(), reason)
}

async fn checked(response: Response, index: &str) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_for(response, index).await)
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchEngine {
    fn name(&self) -> &'static str {
        "elasticsearch"
    }

    async fn create_index(&self, definition: &IndexDefinition) -> Result<()> {
        tracing::info!("Creating index {}", definition.name);
        let body = definition.to_json()?;
        let response = self
            .send(Method::PUT, &[definition.name.as_str()], Some(&body))
            .await?;
        checked(response, &definition.name).await?;
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        tracing::info!("Deleting index {}", index);
        let response = self.send(Method::DELETE, &[index], None).await?;
        checked(response, index).await?;
        Ok(())
    }

    async fn index_meta(&self, index: &str) -> Result<Map<String, Value>> {
        let response = self.send(Method::GET, &[index, "_mapping"], None).await?;
        let body: Value = checked(response, index).await?.json().await?;

        // Keyed by the concrete index name, which differs from `index` for aliases.
        let meta = body
            .as_object()
            .and_then(|indices| indices.values().next())
            .and_then(|entry| entry.pointer("/mappings/_meta"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Ok(meta)
    }

    async fn analyze(&self, index: &str, analyzer: &str, text: &str) -> Result<Vec<AnalyzedToken>> {
        let body = json!({ "analyzer": analyzer, "text": text });
        let response = self
            .send(Method::POST, &[index, "_analyze"], Some(&body))
            .await?;
        let parsed: AnalyzeResponse = checked(response, index).await?.json().await?;
        Ok(parsed.tokens)
    }

    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        source: &Value,
    ) -> Result<String> {
        let response = match id {
            Some(id) => {
                self.send(Method::PUT, &[index, "_doc", id], Some(source))
                    .await?
            }
            None => self.send(Method::POST, &[index, "_doc"], Some(source)).await?,
        };
        let parsed: IndexResponse = checked(response, index).await?.json().await?;
        Ok(parsed.id)
    }

    async fn search(&self, index: &str, query: &MatchQuery) -> Result<Vec<SearchHit>> {
        let body = query.to_json();
        let response = self
            .send(Method::POST, &[index, "_search"], Some(&body))
            .await?;
        let parsed: SearchResponse = checked(response, index).await?.json().await?;
        Ok(parsed.hits.hits)
    }
}
