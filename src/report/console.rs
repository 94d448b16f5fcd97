// src/report/console.rs
// =============================================================================
// Human-readable output on stdout.
//
// Example:
//   🤖 https://example.com/one.html (42 ms)
//   ⚠️  https://example.com/two.html
//       APPEARS ON: https://example.com/
//       STATUS MSG: NOT FOUND (404)
//
//   ✅ 6 links checked in 1.3s
//
// A broken link without an HTTP response shows code 0, e.g. "ENOTFOUND (0)".
// =============================================================================

use async_trait::async_trait;

use super::{ProgressEvent, Reporter, SummaryEvent};
use crate::crawl::BrokenLink;

// Longer URLs get cut so each event stays on one terminal line
const MAX_URL_WIDTH: usize = 100;

#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Reporter for ConsoleReporter {
    async fn on_progress(&self, event: &ProgressEvent) {
        println!("{}", format_progress(event));
    }

    async fn on_broken_link(&self, link: &BrokenLink) {
        println!("{}", format_broken(link));
    }

    async fn on_summary(&self, event: &SummaryEvent) {
        println!();
        println!("{}", format_summary(event));
    }
}

pub fn format_progress(event: &ProgressEvent) -> String {
    format!(
        "🤖 {} ({} ms)",
        truncate(&event.request_url, MAX_URL_WIDTH),
        event.elapsed_ms
    )
}

pub fn format_broken(link: &BrokenLink) -> String {
    format!(
        "⚠️  {}\n    APPEARS ON: {}\n    STATUS MSG: {} ({})",
        truncate(&link.request_url, MAX_URL_WIDTH),
        truncate(&link.reference_url, MAX_URL_WIDTH),
        link.status_message,
        link.status_code.unwrap_or(0)
    )
}

pub fn format_summary(event: &SummaryEvent) -> String {
    format!(
        "✅ {} links checked in {}",
        event.total_links_checked,
        format_elapsed(event.elapsed_ms)
    )
}

// Compact duration: "350ms", "4.2s", "3m 5s"
fn format_elapsed(ms: u64) -> String {
    match ms {
        0..=999 => format!("{}ms", ms),
        1_000..=59_999 => format!("{:.1}s", ms as f64 / 1000.0),
        _ => format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1000),
    }
}

// Cuts on a char boundary, never in the middle of a multi-byte character
fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let kept: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
