//! # yari-search
//!
//! Search indexing for the MDN deployer.
//!
//! ## Features
//!
//! - The `text_analyzer` pipeline used for every text field, as serializable
//!   index settings and as an in-process analyzer
//! - The `mdn_docs` document schema with client-side validation
//! - An Elasticsearch engine and an in-memory engine behind one trait
//! - Detection of indices built from stale analysis settings
//! - Deployer configuration from flags and environment variables
//!
//! ```
//! use yari_search::analysis::analyzer::Analyzer;
//! use yari_search::search::models::build_text_analyzer;
//!
//! let analyzer = build_text_analyzer().unwrap();
//! assert_eq!(analyzer.terms("WebGL").unwrap(), vec!["webgl"]);
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod search;

pub mod prelude {
    pub use crate::analysis::{Analyzer, AnalysisSettings, PipelineAnalyzer, Token};
    pub use crate::config::DeployerConfig;
    pub use crate::error::{DeployerError, Result};
    pub use crate::search::{
        Document, ElasticsearchEngine, EnsureOutcome, LocalEngine, SearchEngine, SearchIndex,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
