//! The documentation page record stored in the search index.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A documentation page as stored in the search index.
///
/// Only `title` is required. Optional fields that are `None` are left out of
/// the indexed source.
///
/// # Examples
///
/// ```
/// use yari_search::search::document::Document;
///
/// let doc = Document::new("<video>: The Video Embed element")
///     .with_locale("en-US")
///     .with_slug("Web/HTML/Element/video")
///     .with_popularity(0.42);
///
/// assert_eq!(doc.doc_id().as_deref(), Some("/en-US/docs/Web/HTML/Element/video"));
/// let source = doc.to_source().unwrap();
/// assert!(source.get("body").is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<f32>,
}

impl Document {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Document {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_body<S: Into<String>>(mut self, body: S) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_summary<S: Into<String>>(mut self, summary: S) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_locale<S: Into<String>>(mut self, locale: S) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_slug<S: Into<String>>(mut self, slug: S) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    pub fn with_popularity(mut self, popularity: f32) -> Self {
        self.popularity = Some(popularity);
        self
    }

    /// The page's URL path, used as document id when locale and slug are known.
    pub fn doc_id(&self) -> Option<String> {
        match (&self.locale, &self.slug) {
            (Some(locale), Some(slug)) => Some(format!("/{locale}/docs/{slug}")),
            _ => None,
        }
    }

    /// The JSON source sent to the engine.
    pub fn to_source(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
