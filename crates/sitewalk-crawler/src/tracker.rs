use std::collections::{btree_map, BTreeMap, BTreeSet};

/// Per-page classification: children, ending links and document URLs.
///
/// Only the crawl engine writes here, while it processes a page.
#[derive(Debug, Default, Clone)]
pub struct ClassificationTracker {
    children: BTreeMap<String, BTreeSet<String>>,
    ending_links: BTreeSet<String>,
    /// Document URL to the depth it was first discovered at
    documents: BTreeMap<String, usize>,
}

impl ClassificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_children<I>(&mut self, url: &str, children: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.children
            .entry(url.to_string())
            .or_default()
            .extend(children);
    }

    pub(crate) fn mark_ending(&mut self, url: &str) -> bool {
        self.ending_links.insert(url.to_string())
    }

    /// Merges `(url, discovery depth)` pairs, returns how many were new
    pub(crate) fn add_documents<I>(&mut self, documents: I) -> usize
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let mut added = 0;
        for (url, depth) in documents {
            if let btree_map::Entry::Vacant(entry) = self.documents.entry(url) {
                entry.insert(depth);
                added += 1;
            }
        }
        added
    }

    pub fn is_ending_link(&self, url: &str) -> bool {
        self.ending_links.contains(url)
    }

    pub fn children_of(&self, url: &str) -> Option<&BTreeSet<String>> {
        self.children.get(url)
    }

    pub fn is_document_url(&self, url: &str) -> bool {
        self.documents.contains_key(url)
    }

    pub fn ending_links(&self) -> impl Iterator<Item = &str> {
        self.ending_links.iter().map(String::as_str)
    }

    /// Document URLs in ascending order with their discovery depth
    pub fn document_urls(&self) -> impl Iterator<Item = (&str, usize)> {
        self.documents.iter().map(|(url, depth)| (url.as_str(), *depth))
    }

    pub fn ending_links_len(&self) -> usize {
        self.ending_links.len()
    }

    pub fn document_urls_len(&self) -> usize {
        self.documents.len()
    }
}
