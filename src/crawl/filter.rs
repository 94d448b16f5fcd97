// src/crawl/filter.rs
// =============================================================================
// Decides whether a discovered link may enter the frontier.
//
// A link is admitted when all of these hold:
// 1. external links are allowed, or the link is on the base host
// 2. none of the ignored query parameters is set to a non-empty value
// 3. the frontier has not seen it before
// 4. it is not on the ignore list, neither as exact URL nor by host
//
// Protocol and nofollow filtering happens earlier, during extraction, since
// it needs the markup. Rejections are never errors, just "not admitted".
// =============================================================================

use std::collections::HashSet;

use crate::checker::Link;
use crate::config::CrawlConfig;

#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    base_host: String,
    ignore_external: bool,
    ignore_query: HashSet<String>,
    ignore_urls: HashSet<String>,
    ignore_domains: HashSet<String>,
}

impl IgnoreFilter {
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            base_host: config.base.host().to_string(),
            ignore_external: config.ignore_external,
            ignore_query: config.ignore_query.clone(),
            ignore_urls: config.ignore_urls.clone(),
            ignore_domains: config.ignore_domains.clone(),
        }
    }

    /// `already_known` is true when the frontier has queued or visited the link.
    pub fn admit(&self, link: &Link, already_known: bool) -> bool {
        !already_known
            && self.is_in_scope(link)
            && !self.has_ignored_query(link)
            && !self.is_ignore_listed(link)
    }

    fn is_in_scope(&self, link: &Link) -> bool {
        !self.ignore_external || link.host() == self.base_host
    }

    fn has_ignored_query(&self, link: &Link) -> bool {
        self.ignore_query.iter().any(|name| {
            link.query_value(name)
                .map_or(false, |value| !value.is_empty())
        })
    }

    fn is_ignore_listed(&self, link: &Link) -> bool {
        self.ignore_urls.contains(link.as_str()) || self.ignore_domains.contains(link.host())
    }
}
