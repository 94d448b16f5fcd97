// src/checker/mod.rs
// =============================================================================
// This module contains everything about checking a single link.
//
// Submodules:
// - resolve: turns href/src values into absolute Links
// - html: extracts candidate links from an HTML page
// - http: fetches a link and classifies it as success or broken
//
// The crawl module decides WHICH links to check; this module only knows HOW.
// =============================================================================

mod html;
mod http;
mod resolve;

// Re-export the public API so callers write `checker::Fetcher` instead of
// `checker::http::Fetcher`
pub use http::{FetchOutcome, FetchReport, Fetcher};
pub use resolve::Link;
