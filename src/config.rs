//! Deployer configuration.
//!
//! Every setting can come from a command line flag or from its environment
//! variable, flags taking precedence. The configuration is read once at start
//! up and then passed around by reference.
//!
//! | Setting | Environment variable | Default |
//! |---|---|---|
//! | content root | `CONTENT_ROOT` | unset |
//! | translated content root | `CONTENT_TRANSLATED_ROOT` | unset |
//! | bucket name | `DEPLOYER_BUCKET_NAME` | `mdn-content-dev` |
//! | bucket prefix | `DEPLOYER_BUCKET_PREFIX` | `main` |
//! | parallel uploads | `DEPLOYER_MAX_WORKERS_PARALLEL_UPLOADS` | `50` |
//! | cache control | `DEPLOYER_CACHE_CONTROL` | one day |
//! | hashed cache control | `DEPLOYER_HASHED_CACHE_CONTROL` | one year |
//! | no progress bar | `DEPLOYER_NO_PROGRESSBAR` | stdout is not a terminal, or `CI` is truthy |
//! | log every upload | `DEPLOYER_LOG_EACH_SUCCESSFUL_UPLOAD` | `false` |
//! | Elasticsearch URL | `DEPLOYER_ELASTICSEARCH_URL` | unset |
//! | Elasticsearch timeout | `DEPLOYER_ELASTICSEARCH_TIMEOUT` | 30 seconds |

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::builder::BoolishValueParser;
use serde_json::Value;

use crate::error::{DeployerError, Result};

/// Default `max-age` for pages, in seconds.
pub const DEFAULT_CACHE_CONTROL: u64 = 60 * 60 * 24;

/// Default `max-age` for content-hashed assets, in seconds.
pub const HASHED_CACHE_CONTROL: u64 = 60 * 60 * 24 * 365;

/// Deployer settings.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "deployer")]
#[command(about = "Deploys the built MDN site and maintains its search index")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct DeployerConfig {
    /// Root of the English content repository
    #[arg(long, env = "CONTENT_ROOT", value_name = "DIR")]
    pub content_root: Option<PathBuf>,

    /// Root of the translated content repository
    #[arg(long, env = "CONTENT_TRANSLATED_ROOT", value_name = "DIR")]
    pub content_translated_root: Option<PathBuf>,

    /// Bucket to upload to
    #[arg(long, env = "DEPLOYER_BUCKET_NAME", default_value = "mdn-content-dev")]
    pub bucket_name: String,

    /// Key prefix inside the bucket
    #[arg(long, env = "DEPLOYER_BUCKET_PREFIX", default_value = "main")]
    pub bucket_prefix: String,

    /// Number of concurrent uploads (and index requests)
    #[arg(
        long,
        env = "DEPLOYER_MAX_WORKERS_PARALLEL_UPLOADS",
        default_value_t = 50,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub max_workers_parallel_uploads: u64,

    /// Cache-Control max-age for pages, e.g. /en-US/docs/Foo/Bar
    #[arg(
        long = "cache-control",
        env = "DEPLOYER_CACHE_CONTROL",
        default_value_t = DEFAULT_CACHE_CONTROL
    )]
    pub default_cache_control: u64,

    /// Cache-Control max-age for hashed assets, e.g. 2.02b14290.chunk.css
    #[arg(
        long = "hashed-cache-control",
        env = "DEPLOYER_HASHED_CACHE_CONTROL",
        default_value_t = HASHED_CACHE_CONTROL
    )]
    pub hashed_cache_control: u64,

    /// Disable the progress bar (default: on when stdout is not a terminal or in CI)
    #[arg(
        long,
        env = "DEPLOYER_NO_PROGRESSBAR",
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub no_progressbar: Option<bool>,

    /// Log every successful upload as it happens
    #[arg(
        long,
        env = "DEPLOYER_LOG_EACH_SUCCESSFUL_UPLOAD",
        action = clap::ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub log_each_successful_upload: bool,

    /// Elasticsearch cluster URL
    #[arg(long, env = "DEPLOYER_ELASTICSEARCH_URL", value_name = "URL")]
    pub elasticsearch_url: Option<String>,

    /// Elasticsearch request timeout in seconds
    #[arg(
        long = "elasticsearch-timeout",
        env = "DEPLOYER_ELASTICSEARCH_TIMEOUT",
        default_value_t = 30,
        value_name = "SECONDS"
    )]
    pub elasticsearch_timeout_secs: u64,
}

impl DeployerConfig {
    /// Read the configuration from the environment alone.
    pub fn from_env() -> Result<Self> {
        Self::try_parse_from(["deployer"]).map_err(|e| DeployerError::config(e.to_string()))
    }

    /// Whether to hide the progress bar.
    pub fn no_progressbar(&self) -> bool {
        self.no_progressbar.unwrap_or_else(|| {
            !std::io::stdout().is_terminal() || is_ci(std::env::var("CI").ok().as_deref())
        })
    }

    /// Number of requests to keep in flight.
    pub fn concurrency(&self) -> usize {
        usize::try_from(self.max_workers_parallel_uploads).unwrap_or(usize::MAX)
    }

    /// Elasticsearch request timeout.
    pub fn elasticsearch_timeout(&self) -> Duration {
        Duration::from_secs(self.elasticsearch_timeout_secs)
    }

    /// `Cache-Control` header value for an uploaded file.
    pub fn cache_control(&self, hashed: bool) -> String {
        let max_age = if hashed {
            self.hashed_cache_control
        } else {
            self.default_cache_control
        };
        if max_age == 0 {
            "no-store, must-revalidate".to_string()
        } else {
            format!("max-age={max_age}, public")
        }
    }

    /// `Cache-Control` header value for a file, by name.
    pub fn cache_control_for(&self, file_name: &str) -> String {
        self.cache_control(is_hashed_asset(file_name))
    }
}

/// Whether a file name carries an eight hex digit content hash, e.g. `2.02b14290.chunk.css`.
pub fn is_hashed_asset(file_name: &str) -> bool {
    let name = file_name.rsplit('/').next().unwrap_or(file_name);
    let segments: Vec<&str> = name.split('.').collect();
    segments.len() > 2
        && segments[1..segments.len() - 1].iter().any(|segment| {
            segment.len() == 8
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        })
}

/// Truthiness of the `CI` variable, read as a JSON value.
///
/// Values that are not JSON count as set when non-empty.
fn is_ci(value: Option<&str>) -> bool {
    let Some(value) = value.map(str::trim) else {
        return false;
    };
    match serde_json::from_str::<Value>(value) {
        Ok(Value::Bool(b)) => b,
        Ok(Value::Null) => false,
        Ok(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Ok(Value::String(s)) => !s.is_empty(),
        Ok(Value::Array(a)) => !a.is_empty(),
        Ok(Value::Object(o)) => !o.is_empty(),
        Err(_) => !value.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> DeployerConfig {
        let mut argv = vec!["deployer"];
        argv.extend_from_slice(args);
        DeployerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.bucket_name, "mdn-content-dev");
        assert_eq!(config.bucket_prefix, "main");
        assert_eq!(config.max_workers_parallel_uploads, 50);
        assert_eq!(config.default_cache_control, 86400);
        assert_eq!(config.hashed_cache_control, 31536000);
        assert!(!config.log_each_successful_upload);
        assert_eq!(config.elasticsearch_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "--bucket-name",
            "mdn-content-prod",
            "--max-workers-parallel-uploads",
            "8",
            "--cache-control",
            "0",
            "--no-progressbar",
            "--log-each-successful-upload",
            "yes",
            "--elasticsearch-url",
            "http://localhost:9200",
        ]);
        assert_eq!(config.bucket_name, "mdn-content-prod");
        assert_eq!(config.concurrency(), 8);
        assert!(config.no_progressbar());
        assert!(config.log_each_successful_upload);
        assert_eq!(config.elasticsearch_url.as_deref(), Some("http://localhost:9200"));
        assert_eq!(config.cache_control(false), "no-store, must-revalidate");

        let config = parse(&["--no-progressbar", "off"]);
        assert!(!config.no_progressbar());
    }

    #[test]
    fn test_invalid_values() {
        assert!(
            DeployerConfig::try_parse_from(["deployer", "--max-workers-parallel-uploads", "0"])
                .is_err()
        );
        assert!(DeployerConfig::try_parse_from(["deployer", "--cache-control", "soon"]).is_err());
        assert!(DeployerConfig::try_parse_from(["deployer", "--no-progressbar", "maybe"]).is_err());
    }

    #[test]
    fn test_cache_control() {
        let config = parse(&[]);
        assert_eq!(config.cache_control(false), "max-age=86400, public");
        assert_eq!(config.cache_control(true), "max-age=31536000, public");
        assert_eq!(
            config.cache_control_for("static/js/2.02b14290.chunk.js"),
            "max-age=31536000, public"
        );
        assert_eq!(config.cache_control_for("en-us/docs/web/index.json"), "max-age=86400, public");
    }

    #[test]
    fn test_is_hashed_asset() {
        assert!(is_hashed_asset("2.02b14290.chunk.css"));
        assert!(is_hashed_asset("main.deadbeef.js"));
        assert!(!is_hashed_asset("deadbeef.js"));
        assert!(!is_hashed_asset("main.DEADBEEF.js"));
        assert!(!is_hashed_asset("main.0123456.js"));
        assert!(!is_hashed_asset("index.html"));
        assert!(!is_hashed_asset("a.deadbeef0.js"));
    }

    #[test]
    fn test_is_ci() {
        assert!(is_ci(Some("true")));
        assert!(is_ci(Some("1")));
        assert!(!is_ci(Some("false")));
        assert!(!is_ci(Some("0")));
        assert!(!is_ci(None));
        assert!(!is_ci(Some("")));
        assert!(is_ci(Some("yes")));
    }
}
