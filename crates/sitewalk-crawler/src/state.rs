use std::collections::BTreeMap;

use crate::error::FetchError;
use crate::frontier::CrawlTask;
use crate::stats::Statistics;
use crate::tracker::ClassificationTracker;

/// Everything a crawl has learned so far.
///
/// The depth map doubles as the visited set: a URL gets its depth when it
/// is processed, and never before.
#[derive(Debug, Default)]
pub struct CrawlState {
    depths: BTreeMap<String, usize>,
    failed: BTreeMap<String, String>,
    pub(crate) tracker: ClassificationTracker,
    pub(crate) stats: Statistics,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark_visited(&mut self, task: &CrawlTask) {
        if self.depths.insert(task.url.clone(), task.depth).is_none() {
            self.stats.record_processed(task.depth);
        }
    }

    pub(crate) fn record_failure(&mut self, task: &CrawlTask, error: &FetchError) {
        self.failed.insert(task.url.clone(), error.to_string());
        self.stats.urls_failed += 1;
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.depths.contains_key(url)
    }

    /// Visited or already attempted; such URLs are never queued again
    pub fn is_settled(&self, url: &str) -> bool {
        self.is_visited(url) || self.failed.contains_key(url)
    }

    pub fn depth_of(&self, url: &str) -> Option<usize> {
        self.depths.get(url).copied()
    }

    /// Visited URLs in ascending order with their depth
    pub fn visited(&self) -> impl Iterator<Item = (&str, usize)> {
        self.depths.iter().map(|(url, depth)| (url.as_str(), *depth))
    }

    pub fn visited_len(&self) -> usize {
        self.depths.len()
    }

    /// URLs whose single fetch attempt failed, with the cause
    pub fn failed(&self) -> impl Iterator<Item = (&str, &str)> {
        self.failed.iter().map(|(url, e)| (url.as_str(), e.as_str()))
    }

    pub fn tracker(&self) -> &ClassificationTracker {
        &self.tracker
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }
}
