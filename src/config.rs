// src/config.rs
// =============================================================================
// Builds the immutable configuration for one crawl.
//
// The CLI hands us raw strings; here they become a CrawlConfig:
// - the base URL gets "https://" prepended when it has no scheme
// - the optional ignore-list file is read once, before the crawl starts
// - everything else is copied over as-is
//
// The crawl never changes its configuration, so it is shared behind an Arc.
// =============================================================================

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::checker::Link;
use crate::cli::Cli;
use crate::error::ConfigError;

/// Everything the crawl engine needs to know about one run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Crawl root. Its host is the "base host".
    pub base: Link,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Suppress progress events.
    pub silent: bool,
    /// Query parameter names that disqualify a link when set to a non-empty value.
    pub ignore_query: HashSet<String>,
    pub ignore_external: bool,
    pub include_images: bool,
    pub ignore_nofollow: bool,
    /// Exact URLs that are never checked.
    pub ignore_urls: HashSet<String>,
    /// Hosts whose links are never checked.
    pub ignore_domains: HashSet<String>,
    /// Maximum number of requests in flight.
    pub concurrency: usize,
    /// Stop once this many links have been visited.
    pub max_links: Option<usize>,
}

impl CrawlConfig {
    /// Default settings for crawling `base`.
    pub fn for_base(base: Link) -> Self {
        Self {
            base,
            timeout: Duration::from_millis(2000),
            silent: false,
            ignore_query: HashSet::new(),
            ignore_external: false,
            include_images: false,
            ignore_nofollow: false,
            ignore_urls: HashSet::new(),
            ignore_domains: HashSet::new(),
            concurrency: 1,
            max_links: None,
        }
    }

    // Validates the CLI input and loads the ignore list
    //
    // Errors:
    //   MissingBaseUrl / InvalidBaseUrl: no usable URL was given
    //   IgnoreListRead / IgnoreListParse: the ignore-list file exists but is unusable
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let raw = cli.url.as_deref().ok_or(ConfigError::MissingBaseUrl)?;
        let base = parse_base_url(raw)?;

        let ignore_list = match &cli.ignore_list {
            Some(path) => IgnoreList::load(path)?,
            None => IgnoreList::default(),
        };

        let mut config = Self::for_base(base);
        config.timeout = Duration::from_millis(cli.timeout);
        config.silent = cli.silent;
        config.ignore_query = cli
            .ignore_query
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        config.ignore_external = cli.ignore_external;
        config.include_images = cli.include_images;
        config.ignore_nofollow = cli.ignore_nofollow;
        config.ignore_urls = ignore_list.urls.into_iter().collect();
        config.ignore_domains = ignore_list.domains.into_iter().collect();
        config.concurrency = cli.concurrency.max(1);
        config.max_links = cli.max_links;

        Ok(config)
    }
}

/// Contents of the `--ignore-list` file.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct IgnoreList {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
}

impl IgnoreList {
    /// Reads the ignore list. A missing file is not an error, just an empty list.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!("Ignore list {} does not exist, ignoring it", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::IgnoreListRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::IgnoreListParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

// Parses the base URL, assuming https when no scheme was given
fn parse_base_url(raw: &str) -> Result<Link, ConfigError> {
    let candidate = prepend_https(raw).ok_or(ConfigError::MissingBaseUrl)?;

    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: candidate.clone(),
        reason,
    };

    let link = Link::parse(&candidate).map_err(|e| invalid(e.source.to_string()))?;
    if link.host().is_empty() {
        return Err(invalid("URL has no host".to_string()));
    }
    Ok(link)
}

// Prepends "https://" unless the input already has a scheme
//
// Returns None for empty input.
//
// Examples:
//   "example.com"           -> "https://example.com"
//   "localhost:3000"        -> "https://localhost:3000"  (a port, not a scheme)
//   "http://example.com"    -> "http://example.com"
//   "/relative" or "./here" -> unchanged
pub fn prepend_https(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let relative = trimmed.trim_start_matches('.').starts_with('/');
    if relative || has_scheme(trimmed) {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{}", trimmed))
    }
}

fn has_scheme(value: &str) -> bool {
    if value.starts_with("localhost") {
        return false;
    }
    match value.find(':') {
        Some(end) if end > 0 => value[..end]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_prepend_https() {
        assert_eq!(prepend_https("example.com").as_deref(), Some("https://example.com"));
        assert_eq!(prepend_https("  example.com/docs ").as_deref(), Some("https://example.com/docs"));
        assert_eq!(prepend_https("http://example.com").as_deref(), Some("http://example.com"));
        assert_eq!(prepend_https("localhost:3000").as_deref(), Some("https://localhost:3000"));
        assert_eq!(prepend_https("example.com:8080").as_deref(), Some("https://example.com:8080"));
        assert_eq!(prepend_https("./index.html").as_deref(), Some("./index.html"));
        assert_eq!(prepend_https("   "), None);
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let cli = Cli::try_parse_from(["octoprobe"]).unwrap();
        assert!(matches!(CrawlConfig::from_cli(&cli), Err(ConfigError::MissingBaseUrl)));
    }

    #[test]
    fn test_relative_base_url_is_invalid() {
        let cli = Cli::try_parse_from(["octoprobe", "/just/a/path"]).unwrap();
        assert!(matches!(
            CrawlConfig::from_cli(&cli),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_from_cli_copies_options() {
        let cli = Cli::try_parse_from([
            "octoprobe",
            "example.com",
            "--timeout=750",
            "--ignore-query=continue,",
            "--ignore-external",
            "--concurrency=0",
        ])
        .unwrap();
        let config = CrawlConfig::from_cli(&cli).unwrap();

        assert_eq!(config.base.as_str(), "https://example.com/");
        assert_eq!(config.base.host(), "example.com");
        assert_eq!(config.timeout, Duration::from_millis(750));
        assert_eq!(config.ignore_query, HashSet::from(["continue".to_string()]));
        assert!(config.ignore_external);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_ignore_list_loads_urls_and_domains() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"urls": ["https://example.com/skip"], "domains": ["ads.example.net"]}}"#
        )
        .unwrap();

        let list = IgnoreList::load(file.path()).unwrap();
        assert_eq!(list.urls, vec!["https://example.com/skip"]);
        assert_eq!(list.domains, vec!["ads.example.net"]);
    }

    #[test]
    fn test_ignore_list_keys_are_optional() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"domains": ["ads.example.net"]}}"#).unwrap();

        let list = IgnoreList::load(file.path()).unwrap();
        assert!(list.urls.is_empty());
        assert_eq!(list.domains.len(), 1);
    }

    #[test]
    fn test_missing_ignore_list_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let list = IgnoreList::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(list, IgnoreList::default());
    }

    #[test]
    fn test_invalid_ignore_list_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = IgnoreList::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IgnoreListParse { .. }));
    }

    #[test]
    fn test_from_cli_applies_ignore_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"urls": ["https://example.com/skip"]}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["octoprobe", "example.com", "--ignore-list", &path]).unwrap();
        let config = CrawlConfig::from_cli(&cli).unwrap();
        assert!(config.ignore_urls.contains("https://example.com/skip"));
        assert!(config.ignore_domains.is_empty());
    }
}
