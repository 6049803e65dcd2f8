use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Running counters, kept in step with the crawl state for cheap reporting
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    started: Option<Instant>,
    pub(crate) urls_found: usize,
    pub(crate) urls_processed: usize,
    pub(crate) urls_failed: usize,
    pub(crate) max_depth: usize,
    pub(crate) depth_counts: BTreeMap<usize, usize>,
    pub(crate) ending_links_count: usize,
    pub(crate) document_urls_found: usize,
}

impl Statistics {
    pub(crate) fn start(&mut self) {
        self.started.get_or_insert_with(Instant::now);
    }

    pub(crate) fn record_processed(&mut self, depth: usize) {
        self.urls_processed += 1;
        self.max_depth = self.max_depth.max(depth);
        *self.depth_counts.entry(depth).or_default() += 1;
    }

    pub fn urls_processed(&self) -> usize {
        self.urls_processed
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            elapsed: self.started.map(|t| t.elapsed()).unwrap_or_default(),
            urls_found: self.urls_found,
            urls_processed: self.urls_processed,
            urls_failed: self.urls_failed,
            max_depth: self.max_depth,
            depth_counts: self.depth_counts.clone(),
            ending_links_count: self.ending_links_count,
            document_urls_found: self.document_urls_found,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub elapsed: Duration,
    pub urls_found: usize,
    pub urls_processed: usize,
    pub urls_failed: usize,
    pub max_depth: usize,
    pub depth_counts: BTreeMap<usize, usize>,
    pub ending_links_count: usize,
    pub document_urls_found: usize,
}
