use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::DocumentHeuristic;
use crate::traits::LinkExtractor;

static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static CLICKABLES: Lazy<Selector> = Lazy::new(|| Selector::parse("a, button").unwrap());

/// Resolves `href` against `base`, dropping any `#fragment`
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim().split('#').next().unwrap_or_default();
    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}

#[derive(Debug, Clone)]
pub struct HtmlLinkExtractor {
    text_pattern: Regex,
    href_pattern: Regex,
}

impl HtmlLinkExtractor {
    pub fn new(heuristic: &DocumentHeuristic) -> Result<Self, regex::Error> {
        let build = |pattern: &str| RegexBuilder::new(pattern).case_insensitive(true).build();
        Ok(Self {
            text_pattern: build(&heuristic.text_pattern)?,
            href_pattern: build(&heuristic.href_pattern)?,
        })
    }

    fn looks_like_document(&self, elem: &ElementRef) -> bool {
        let value = elem.value();
        let text: String = elem.text().collect();
        self.text_pattern.is_match(text.trim())
            || value.id().is_some_and(|id| self.text_pattern.is_match(id))
            || (value.name() == "a"
                && value
                    .attr("href")
                    .is_some_and(|href| self.href_pattern.is_match(href)))
    }
}

impl Default for HtmlLinkExtractor {
    fn default() -> Self {
        Self::new(&DocumentHeuristic::default()).unwrap()
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, html: &str, base: &Url) -> Vec<Url> {
        let document = Html::parse_document(html);
        let hrefs = document
            .select(&ANCHORS)
            .filter_map(|elem| elem.value().attr("href"));
        resolve_unique(base, hrefs)
    }

    fn extract_document_candidates(&self, html: &str, base: &Url) -> Vec<Url> {
        let document = Html::parse_document(html);
        let hrefs = document
            .select(&CLICKABLES)
            .filter(|elem| self.looks_like_document(elem))
            .filter_map(|elem| elem.value().attr("href"));
        resolve_unique(base, hrefs)
    }
}

fn resolve_unique<'a, I>(base: &Url, hrefs: I) -> Vec<Url>
where
    I: Iterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    hrefs
        .filter_map(|href| resolve_link(base, href))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/papers/index.html").unwrap()
    }

    fn strings(urls: Vec<Url>) -> Vec<String> {
        urls.into_iter().map(String::from).collect()
    }

    #[test]
    fn resolves_relative_and_strips_fragments() {
        assert_eq!(
            resolve_link(&base(), "/docs#intro").unwrap().as_str(),
            "https://example.com/docs"
        );
        assert_eq!(
            resolve_link(&base(), "2021.html").unwrap().as_str(),
            "https://example.com/papers/2021.html"
        );
        assert_eq!(
            resolve_link(&base(), "#top").unwrap().as_str(),
            "https://example.com/papers/index.html"
        );
        assert_eq!(
            resolve_link(&base(), "https://other.com/x").unwrap().as_str(),
            "https://other.com/x"
        );
    }

    #[test]
    fn links_keep_document_order_without_duplicates() {
        let html = r#"
            <a href="/b">B</a>
            <a href="/a">A</a>
            <a href="/b#again">B again</a>
            <a>no href</a>
            <a href="https://other.com/x">elsewhere</a>
        "#;
        let links = HtmlLinkExtractor::default().extract_links(html, &base());
        assert_eq!(
            strings(links),
            [
                "https://example.com/b",
                "https://example.com/a",
                "https://other.com/x"
            ]
        );
    }

    #[test]
    fn documents_match_text_id_or_href() {
        let html = r#"
            <a href="/doc?id=5">View Paper</a>
            <a id="viewer-link" href="/plain">Open</a>
            <a href="/documents/2020">Archive</a>
            <button>view without href</button>
            <a href="/about">About us</a>
        "#;
        let docs = HtmlLinkExtractor::default().extract_document_candidates(html, &base());
        assert_eq!(
            strings(docs),
            [
                "https://example.com/doc?id=5",
                "https://example.com/plain",
                "https://example.com/documents/2020"
            ]
        );
    }

    #[test]
    fn document_text_is_case_insensitive() {
        let heuristic = DocumentHeuristic {
            text_pattern: "download".into(),
            href_pattern: "^$".into(),
        };
        let extractor = HtmlLinkExtractor::new(&heuristic).unwrap();
        let html = r#"<a href="/f/1">DOWNLOAD</a><a href="/f/2">View</a>"#;
        let docs = extractor.extract_document_candidates(html, &base());
        assert_eq!(strings(docs), ["https://example.com/f/1"]);
    }
}
