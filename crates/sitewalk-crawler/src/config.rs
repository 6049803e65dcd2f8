use std::time::Duration;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CrawlError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default)]
    pub seed_url: String,

    /// Overrides the scope authority, which is otherwise the seed's origin
    #[serde(default)]
    pub scope: Option<String>,

    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,

    #[serde(default = "default_delay")]
    pub delay: Delay,

    #[serde(default)]
    pub delay_seed: Option<u64>,

    /// Fetch timeout in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: f32,

    #[serde(default = "default_ready_selector")]
    pub ready_selector: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    #[serde(default)]
    pub documents: DocumentHeuristic,

    #[serde(default = "default_true")]
    pub track_documents: bool,

    #[serde(default = "default_true")]
    pub track_ending_links: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            scope: None,
            excluded_paths: default_excluded_paths(),
            delay: default_delay(),
            delay_seed: None,
            fetch_timeout: default_fetch_timeout(),
            ready_selector: default_ready_selector(),
            user_agent: default_user_agent(),
            progress_interval: default_progress_interval(),
            documents: DocumentHeuristic::default(),
            track_documents: true,
            track_ending_links: true,
        }
    }
}

impl CrawlerConfig {
    pub fn with_seed(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            ..Default::default()
        }
    }

    /// The parsed seed, without its `#fragment` like every discovered link
    pub fn seed(&self) -> Result<Url, CrawlError> {
        let mut seed = Url::parse(&self.seed_url).map_err(|e| {
            CrawlError::Config(format!("invalid seed URL {:?}: {e}", self.seed_url))
        })?;
        seed.set_fragment(None);
        Ok(seed)
    }

    /// The URL whose origin bounds the crawl
    pub fn scope_url(&self) -> Result<Url, CrawlError> {
        match &self.scope {
            Some(scope) => Url::parse(scope)
                .map_err(|e| CrawlError::Config(format!("invalid scope URL {scope:?}: {e}"))),
            None => self.seed(),
        }
    }

    pub fn fetch_timeout(&self) -> Result<Duration, CrawlError> {
        match Duration::try_from_secs_f32(self.fetch_timeout) {
            Ok(timeout) if !timeout.is_zero() => Ok(timeout),
            _ => Err(CrawlError::Config(format!(
                "fetch timeout must be a positive number of seconds, got {}",
                self.fetch_timeout
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), CrawlError> {
        self.seed()?;
        self.scope_url()?;

        let (min, max) = self.delay.bounds()?;
        if min > max {
            return Err(CrawlError::Config(format!(
                "minimum delay {} exceeds maximum delay {}",
                self.delay.min, self.delay.max
            )));
        }
        self.fetch_timeout()?;
        if self.progress_interval == 0 {
            return Err(CrawlError::Config(
                "progress interval must be at least 1".into(),
            ));
        }
        if scraper::Selector::parse(&self.ready_selector).is_err() {
            return Err(CrawlError::Config(format!(
                "invalid ready selector {:?}",
                self.ready_selector
            )));
        }
        self.documents.validate()?;

        Ok(())
    }
}

/// Bounds in seconds of the randomized wait before each fetch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    pub min: f32,
    pub max: f32,
}

impl Delay {
    pub fn none() -> Self {
        Self { min: 0.0, max: 0.0 }
    }

    pub fn bounds(&self) -> Result<(Duration, Duration), CrawlError> {
        let secs = |bound: f32| {
            Duration::try_from_secs_f32(bound).map_err(|e| {
                CrawlError::Config(format!("invalid delay bound {bound}: {e}"))
            })
        };
        Ok((secs(self.min)?, secs(self.max)?))
    }
}

/// Case-insensitive patterns flagging links that likely open a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHeuristic {
    /// Matched against the text and `id` of anchors and buttons
    #[serde(default = "default_text_pattern")]
    pub text_pattern: String,

    /// Matched against the `href` of anchors
    #[serde(default = "default_href_pattern")]
    pub href_pattern: String,
}

impl Default for DocumentHeuristic {
    fn default() -> Self {
        Self {
            text_pattern: default_text_pattern(),
            href_pattern: default_href_pattern(),
        }
    }
}

impl DocumentHeuristic {
    fn validate(&self) -> Result<(), CrawlError> {
        for pattern in [&self.text_pattern, &self.href_pattern] {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    CrawlError::Config(format!("invalid document pattern {pattern:?}: {e}"))
                })?;
        }
        Ok(())
    }
}

fn default_excluded_paths() -> Vec<String> {
    [
        "/cdn-cgi/l/email-protection",
        "/wp-admin/",
        "/tag/",
        "/category/",
        "/author/",
        "/wp-includes/",
        "/wp-content/",
        "/wp-content/plugins/",
        "/wp-content/themes/",
        "/wp-content/uploads/",
        ".jpg",
        ".jpeg",
        ".png",
        ".gif",
        ".pdf",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_delay() -> Delay {
    Delay { min: 2.0, max: 5.0 }
}

fn default_fetch_timeout() -> f32 {
    10.0
}

fn default_ready_selector() -> String {
    String::from("body")
}

fn default_user_agent() -> String {
    String::from(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    )
}

fn default_progress_interval() -> usize {
    5
}

fn default_text_pattern() -> String {
    String::from("view")
}

fn default_href_pattern() -> String {
    String::from("view|document|doc|id=")
}

fn default_true() -> bool {
    true
}
