//! The documentation search index and the engines that host it.

pub mod document;
pub mod elasticsearch;
pub mod engine;
pub mod index;
pub mod local;
pub mod mapping;
pub mod models;

pub use self::document::Document;
pub use self::elasticsearch::ElasticsearchEngine;
pub use self::engine::{AnalyzedToken, MatchQuery, SearchEngine, SearchHit};
pub use self::index::{EnsureOutcome, SearchIndex};
pub use self::local::LocalEngine;
pub use self::models::{INDEX_NAME, IndexDefinition, TEXT_ANALYZER};
