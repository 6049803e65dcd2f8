//! Seams between the crawl engine and the pieces it drives.

use std::error::Error as StdError;

use async_trait::async_trait;
use url::Url;

use crate::crawler::Phase;
use crate::error::FetchError;
use crate::frontier::CrawlTask;
use crate::state::CrawlState;
use crate::stats::StatsSnapshot;

/// Renders a URL and hands back its HTML once the page is ready.
///
/// The engine owns the fetcher for the whole crawl and calls `close`
/// exactly once, whatever way the crawl ends.
#[async_trait]
pub trait PageFetcher: Send {
    async fn fetch(&mut self, url: &Url) -> Result<String, FetchError>;

    async fn close(&mut self) -> Result<(), FetchError> {
        Ok(())
    }
}

/// Turns fetched HTML into absolute candidate URLs, in document order.
pub trait LinkExtractor {
    fn extract_links(&self, html: &str, base: &Url) -> Vec<Url>;

    /// Links that look like they open a document
    fn extract_document_candidates(&self, html: &str, base: &Url) -> Vec<Url>;
}

/// Read-only view handed to progress displays
#[derive(Debug, Clone)]
pub struct Progress<'a> {
    pub phase: Phase,
    pub stats: StatsSnapshot,
    pub queue_len: usize,
    pub next: Option<&'a CrawlTask>,
}

pub trait ProgressDisplay {
    fn refresh(&mut self, progress: &Progress<'_>);
}

/// Writes the final inventory; must cope with an empty crawl state
pub trait InventorySink {
    type Error: StdError + Send + Sync + 'static;

    fn persist(&self, state: &CrawlState) -> Result<(), Self::Error>;
}

/// Progress as a single log line
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressDisplay for LogProgress {
    fn refresh(&mut self, progress: &Progress<'_>) {
        let Progress {
            phase,
            stats,
            queue_len,
            next,
        } = progress;
        log::info!(
            "{phase:?}: {} processed, {} found, {} failed, {queue_len} queued, max depth {}, \
             {} ending, {} documents{}",
            stats.urls_processed,
            stats.urls_found,
            stats.urls_failed,
            stats.max_depth,
            stats.ending_links_count,
            stats.document_urls_found,
            next.map(|t| format!(", next {} (depth {})", t.url, t.depth))
                .unwrap_or_default()
        );
    }
}

/// Discards every refresh
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressDisplay for NoProgress {
    fn refresh(&mut self, _progress: &Progress<'_>) {}
}
