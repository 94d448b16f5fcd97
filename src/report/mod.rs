// src/report/mod.rs
// =============================================================================
// This module delivers crawl events to the outside world.
//
// The crawl engine knows nothing about terminals or Slack. It calls the
// Reporter trait, and whatever is plugged in decides what to do:
// - console: progress lines, broken-link blocks and the final summary
// - slack: one webhook message per broken link
//
// Events are delivered in order: the crawler awaits each call before moving on.
// =============================================================================

mod console;
mod slack;

use async_trait::async_trait;
use serde::Serialize;

use crate::crawl::BrokenLink;

pub use console::ConsoleReporter;
pub use slack::SlackReporter;

/// One finished request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub request_url: String,
    pub elapsed_ms: u64,
}

/// Emitted once when the crawl is done.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEvent {
    pub total_links_checked: usize,
    pub elapsed_ms: u64,
}

/// Receives crawl events. Every method defaults to doing nothing, so a
/// reporter only implements what it cares about.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn on_progress(&self, _event: &ProgressEvent) {}

    /// Called once per distinct broken URL.
    async fn on_broken_link(&self, _link: &BrokenLink) {}

    async fn on_summary(&self, _event: &SummaryEvent) {}
}

/// Forwards every event to each reporter in turn.
#[derive(Default)]
pub struct Reporters {
    inner: Vec<Box<dyn Reporter>>,
}

impl Reporters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reporter: impl Reporter + 'static) -> Self {
        self.inner.push(Box::new(reporter));
        self
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl Reporter for Reporters {
    async fn on_progress(&self, event: &ProgressEvent) {
        for reporter in &self.inner {
            reporter.on_progress(event).await;
        }
    }

    async fn on_broken_link(&self, link: &BrokenLink) {
        for reporter in &self.inner {
            reporter.on_broken_link(link).await;
        }
    }

    async fn on_summary(&self, event: &SummaryEvent) {
        for reporter in &self.inner {
            reporter.on_summary(event).await;
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[async_trait]?
//    - Trait objects (Box<dyn Reporter>) cannot have plain async methods yet
//    - The macro rewrites them to return boxed futures
//
// 2. Why Box<dyn Reporter>?
//    - Console and Slack reporters are different types
//    - Boxing them lets one Vec hold both
// -----------------------------------------------------------------------------
