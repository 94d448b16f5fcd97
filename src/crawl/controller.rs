// src/crawl/controller.rs
// =============================================================================
// Drives a crawl from the base URL until the frontier runs dry.
//
// How it works:
// 1. The frontier starts with just the base URL
// 2. Take the next link from the frontier and mark it visited
// 3. Fetch it; successful HTML pages on the base host yield more links
// 4. Each discovered link goes back through the filter into the frontier,
//    with the page it was found on as its reference
// 5. Broken links go to the reporter, once per URL
// 6. Repeat until nothing is queued and nothing is in flight, then report
//    the summary
//
// Up to `concurrency` fetches run at once. They all live in one
// FuturesUnordered polled by this task, so the frontier has a single owner:
// taking a link and marking it visited can never interleave with another
// worker, and no lock is needed.
//
// Stop conditions besides an empty frontier:
// - the cancellation signal flips to true (e.g. Ctrl+C)
// - `max_links` links have been visited
// In both cases in-flight fetches still complete and get reported.
// =============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use super::filter::IgnoreFilter;
use super::frontier::{BrokenLink, Frontier, ReferenceEdge};
use crate::checker::{FetchOutcome, FetchReport, Fetcher};
use crate::config::CrawlConfig;
use crate::report::{ProgressEvent, Reporter, SummaryEvent};

/// Where the crawler is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Only the base URL is known.
    Idle,
    /// Fetching and discovering links.
    Running,
    /// Nothing left to start; waiting for the summary to go out.
    Draining,
    /// Summary reported.
    Done,
}

/// Result of a finished crawl.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub total_links_checked: usize,
    pub elapsed_ms: u64,
    /// True when the crawl stopped early (cancelled or hit `max_links`).
    pub stopped_early: bool,
    pub broken_links: Vec<BrokenLink>,
}

pub struct Crawler<R: Reporter> {
    config: Arc<CrawlConfig>,
    fetcher: Fetcher,
    reporter: R,
    cancel: Option<watch::Receiver<bool>>,
    state: CrawlState,
}

impl<R: Reporter> Crawler<R> {
    pub fn new(config: Arc<CrawlConfig>, reporter: R) -> reqwest::Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            config,
            fetcher,
            reporter,
            cancel: None,
            state: CrawlState::Idle,
        })
    }

    /// Stops taking new links once the receiver sees `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Crawls the whole site and returns what was found.
    pub async fn run(&mut self) -> CrawlReport {
        let started = Instant::now();
        let mut frontier = Frontier::new(IgnoreFilter::new(&self.config), self.config.base.clone());
        let mut in_flight = FuturesUnordered::new();
        let mut stopped_early = false;

        self.transition(CrawlState::Running);

        loop {
            // Top up the pool of running fetches
            while !stopped_early && in_flight.len() < self.config.concurrency && !frontier.is_exhausted() {
                if self.should_stop(&frontier) {
                    stopped_early = true;
                    break;
                }

                let Some(edge) = frontier.dequeue_next() else {
                    break;
                };
                frontier.mark_visited(&edge.request);

                let fetcher = self.fetcher.clone();
                in_flight.push(async move {
                    let report = fetcher.fetch(&edge.request).await;
                    (edge, report)
                });
            }

            // Nothing running means nothing more can be discovered
            let Some((edge, report)) = in_flight.next().await else {
                break;
            };
            self.handle_fetched(&mut frontier, edge, report).await;
        }

        self.transition(CrawlState::Draining);

        let summary = SummaryEvent {
            total_links_checked: frontier.visited_count(),
            elapsed_ms: millis(started.elapsed()),
        };
        info!(
            "Crawl finished: {} links checked, {} broken",
            summary.total_links_checked,
            frontier.broken().len()
        );
        self.reporter.on_summary(&summary).await;

        self.transition(CrawlState::Done);

        CrawlReport {
            total_links_checked: summary.total_links_checked,
            elapsed_ms: summary.elapsed_ms,
            stopped_early,
            broken_links: frontier.into_broken(),
        }
    }

    // Feeds one finished fetch back into the frontier and the reporter
    async fn handle_fetched(&self, frontier: &mut Frontier, edge: ReferenceEdge, report: FetchReport) {
        if !self.config.silent {
            self.reporter
                .on_progress(&ProgressEvent {
                    request_url: edge.request.to_string(),
                    elapsed_ms: millis(report.elapsed),
                })
                .await;
        }

        match report.outcome {
            FetchOutcome::Success { links } => {
                let discovered = links.len();
                let mut admitted = 0;
                for link in links {
                    let queued = frontier.enqueue(ReferenceEdge {
                        request: link,
                        reference: edge.request.clone(),
                    });
                    if queued {
                        admitted += 1;
                    }
                }
                debug!(
                    "{}: {} links found, {} new, {} queued",
                    edge.request,
                    discovered,
                    admitted,
                    frontier.queued_count()
                );
            }
            FetchOutcome::Broken {
                status_code,
                status_message,
            } => {
                let record = BrokenLink {
                    request_url: edge.request.to_string(),
                    reference_url: edge.reference.to_string(),
                    status_code,
                    status_message,
                };
                if frontier.record_broken(record.clone()) {
                    self.reporter.on_broken_link(&record).await;
                }
            }
        }
    }

    fn should_stop(&self, frontier: &Frontier) -> bool {
        let cancelled = self.cancel.as_ref().map_or(false, |rx| *rx.borrow());
        if cancelled {
            info!("Crawl cancelled, finishing requests in flight");
            return true;
        }

        match self.config.max_links {
            Some(max) if frontier.visited_count() >= max => {
                info!("Reached the limit of {} links", max);
                true
            }
            _ => false,
        }
    }

    fn transition(&mut self, next: CrawlState) {
        debug!("Crawler state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is FuturesUnordered?
//    - A collection of futures that yields each result as soon as it is
//      ready, in whatever order they finish
//    - Like buffer_unordered(N), but we decide when to push the next future,
//      so new links can be added while others are still running
//
// 2. What is a watch channel?
//    - A channel that only keeps the latest value
//    - The Ctrl+C handler sends `true` once; the crawler just reads the
//      current value with borrow() before each new fetch
//
// 3. What does `let ... else` do?
//    - let Some(x) = expr else { break; } binds x or runs the else block
//    - The else block must leave the scope (break, return, continue)
// -----------------------------------------------------------------------------
