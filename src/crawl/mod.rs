// src/crawl/mod.rs
// =============================================================================
// This module is the crawl engine.
//
// - filter: which discovered links may be checked at all
// - frontier: queue of waiting links, visited set, broken-link records
// - controller: the loop that ties fetching, filtering and reporting together
//
// A crawl visits every link at most once and stops when no link is waiting
// and no request is in flight.
// =============================================================================

mod controller;
mod filter;
mod frontier;

pub use controller::{CrawlReport, Crawler};
pub use frontier::BrokenLink;
