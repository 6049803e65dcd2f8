use std::collections::HashSet;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CrawlTask {
    pub url: String,
    pub depth: usize,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }

    pub fn child(&self, url: impl Into<String>) -> Self {
        Self::new(url, self.depth + 1)
    }
}

/// Pending tasks in stack order, so the crawl goes depth-first.
///
/// A pending index mirrors the stack for constant-time membership checks.
/// Callers must not push a URL that is already pending.
#[derive(Debug, Default)]
pub struct Frontier {
    stack: Vec<CrawlTask>,
    pending: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<I>(&mut self, tasks: I)
    where
        I: IntoIterator<Item = CrawlTask>,
    {
        for task in tasks {
            let fresh = self.pending.insert(task.url.clone());
            debug_assert!(fresh, "{} pushed while already pending", task.url);
            self.stack.push(task);
        }
    }

    /// Removes the most recently pushed task
    pub fn pop(&mut self) -> Option<CrawlTask> {
        let task = self.stack.pop()?;
        self.pending.remove(&task.url);
        Some(task)
    }

    /// The task `pop` would return next
    pub fn peek_tail(&self) -> Option<&CrawlTask> {
        self.stack.last()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pending.contains(url)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
