// src/crawl/frontier.rs
// =============================================================================
// The crawl engine's state: what is waiting, what was visited, what broke.
//
// - queue: links discovered but not visited yet, in discovery order, each
//   paired with the page it was first found on
// - known: every link that was ever queued, so a link enters the queue at
//   most once no matter how many pages point to it
// - visited: links whose fetch has started
// - broken: one record per distinct broken URL
//
// Invariant: queue and visited never share a link. A link moves from the
// queue to visited in one step (dequeue_next + mark_visited), and `known`
// keeps it from ever being queued again.
// =============================================================================

use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use super::filter::IgnoreFilter;
use crate::checker::Link;

/// "`request` was discovered on the page at `reference`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEdge {
    pub request: Link,
    pub reference: Link,
}

/// A link that did not answer with 200 or 204.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub request_url: String,
    /// First page the link was discovered on.
    pub reference_url: String,
    /// None when no HTTP response was received.
    pub status_code: Option<u16>,
    pub status_message: String,
}

#[derive(Debug)]
pub struct Frontier {
    filter: IgnoreFilter,
    queue: VecDeque<ReferenceEdge>,
    known: HashSet<Link>,
    visited: HashSet<Link>,
    broken: Vec<BrokenLink>,
    broken_urls: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier holding only the seed, referenced by itself.
    /// The seed bypasses the filter: the base URL is always checked.
    pub fn new(filter: IgnoreFilter, seed: Link) -> Self {
        let mut frontier = Self {
            filter,
            queue: VecDeque::new(),
            known: HashSet::new(),
            visited: HashSet::new(),
            broken: Vec::new(),
            broken_urls: HashSet::new(),
        };

        frontier.known.insert(seed.clone());
        frontier.queue.push_back(ReferenceEdge {
            request: seed.clone(),
            reference: seed,
        });
        frontier
    }

    /// Appends the edge if the filter admits its link. Returns whether it did.
    /// The first page a link is found on stays its reference.
    pub fn enqueue(&mut self, edge: ReferenceEdge) -> bool {
        let already_known = self.known.contains(&edge.request);
        if !self.filter.admit(&edge.request, already_known) {
            return false;
        }

        self.known.insert(edge.request.clone());
        self.queue.push_back(edge);
        true
    }

    /// Removes and returns the oldest waiting edge.
    pub fn dequeue_next(&mut self) -> Option<ReferenceEdge> {
        self.queue.pop_front()
    }

    /// Records that `link` is being fetched. Returns false if it already was.
    pub fn mark_visited(&mut self, link: &Link) -> bool {
        debug_assert!(self.known.contains(link), "only dequeued links get visited");
        self.visited.insert(link.clone())
    }

    /// Stores a broken link unless its URL was already recorded.
    /// Returns true for a new record.
    pub fn record_broken(&mut self, record: BrokenLink) -> bool {
        if !self.broken_urls.insert(record.request_url.clone()) {
            return false;
        }
        self.broken.push(record);
        true
    }

    #[cfg(test)]
    pub fn is_visited(&self, link: &Link) -> bool {
        self.visited.contains(link)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn broken(&self) -> &[BrokenLink] {
        &self.broken
    }

    pub fn into_broken(self) -> Vec<BrokenLink> {
        self.broken
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why both `known` and `visited`?
//    - `known` answers "was this link ever queued?" in O(1), so the queue
//      never holds a link twice
//    - `visited` is what the summary counts
//
// 2. Why does the seed bypass the filter?
//    - The base URL is always checked, even if it carries an ignored query
//      parameter or sits on the ignore list
// -----------------------------------------------------------------------------
