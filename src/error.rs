// src/error.rs
// =============================================================================
// Typed errors for the parts of the program that can fail before or outside
// the crawl itself.
//
// Only ConfigError ever stops the program. ResolutionError is swallowed
// during link extraction, and fetch failures never become errors at all:
// they are turned into BrokenLink records by the fetcher.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems with the run's configuration. Each one exits with code 1.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Base URL is needed")]
    MissingBaseUrl,

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Could not read ignore list {path:?}: {source}")]
    IgnoreListRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON object in {path:?} configuration file: {source}")]
    IgnoreListParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An href or src attribute that does not resolve to an absolute URL.
#[derive(Debug, Error)]
#[error("cannot resolve '{raw}': {source}")]
pub struct ResolutionError {
    pub raw: String,
    #[source]
    pub source: url::ParseError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_base_url_message() {
        assert_eq!(ConfigError::MissingBaseUrl.to_string(), "Base URL is needed");
    }

    #[test]
    fn test_parse_error_mentions_file() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = ConfigError::IgnoreListParse {
            path: PathBuf::from("ignore.json"),
            source,
        };
        assert!(err.to_string().contains("\"ignore.json\""));
    }
}
