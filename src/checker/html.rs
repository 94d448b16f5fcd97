// src/checker/html.rs
// =============================================================================
// This module extracts candidate links from an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// What gets extracted:
// - href of every <a> element, unless it points at a protocol we never
//   check (javascript:, mailto:, tel:, ...) or is a bare #fragment
// - with ignore_nofollow, anchors with rel="nofollow" are skipped too
// - with include_images, src of every <img> element
//
// Each page's result is deduplicated, keeping the first occurrence.
// =============================================================================

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::resolve::{resolve, Link};

// href prefixes that never lead to a checkable page
const IGNORED_PREFIXES: &[&str] = &[
    "javascript:",
    "mailto:",
    "telnet:",
    "file:",
    "news:",
    "tel:",
    "ftp:",
    "#",
];

/// Which elements to collect from a page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub include_images: bool,
    pub ignore_nofollow: bool,
}

// Extracts all candidate links from HTML content
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   page_url: the URL of the page (for resolving relative links)
//   options: whether to also collect images / skip nofollow anchors
//
// Returns: Vec<Link> in page order, without duplicates
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='mailto:x@y.z'>Mail</a>"
//   page_url = "https://example.com"
//   result = ["https://example.com/docs"]
pub fn extract_links(html: &str, page_url: &Url, options: ExtractOptions) -> Vec<Link> {
    let document = Html::parse_document(html);

    // Both selectors are constants and known to be valid
    let anchors = Selector::parse("a[href]").unwrap();
    let images = Selector::parse("img[src]").unwrap();

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&anchors) {
        if !is_followable_anchor(&element, options.ignore_nofollow) {
            continue;
        }
        if let Some(href) = element.value().attr("href") {
            push_resolved(href, page_url, &mut seen, &mut links);
        }
    }

    if options.include_images {
        for element in document.select(&images) {
            if let Some(src) = element.value().attr("src") {
                push_resolved(src, page_url, &mut seen, &mut links);
            }
        }
    }

    links
}

// Resolves one attribute value and appends it unless this page already had it.
// Empty values and values that do not resolve are dropped.
fn push_resolved(raw: &str, page_url: &Url, seen: &mut HashSet<String>, links: &mut Vec<Link>) {
    if raw.is_empty() {
        return;
    }

    match resolve(raw, page_url) {
        Ok(link) => {
            if seen.insert(link.as_str().to_string()) {
                links.push(link);
            }
        }
        Err(e) => debug!("Dropping link on {}: {}", page_url, e),
    }
}

fn is_followable_anchor(element: &ElementRef, ignore_nofollow: bool) -> bool {
    let href = element.value().attr("href").unwrap_or_default();
    if IGNORED_PREFIXES.iter().any(|prefix| starts_with_ignore_case(href, prefix)) {
        return false;
    }

    if ignore_nofollow {
        let rel = element.value().attr("rel").unwrap_or_default();
        if rel
            .split_ascii_whitespace()
            .any(|token| token.eq_ignore_ascii_case("nofollow"))
        {
            return false;
        }
    }

    true
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why filter on the raw href instead of the resolved URL?
//    - "#top" resolves to "<page>#top", which looks like a normal http link
//    - Only the markup tells us it was a same-page fragment
//    - The same goes for rel="nofollow", which is not part of the URL at all
//
// 2. Why a HashSet next to the Vec?
//    - The Vec keeps page order (first occurrence wins)
//    - The HashSet makes the "seen on this page?" check O(1)
// -----------------------------------------------------------------------------
