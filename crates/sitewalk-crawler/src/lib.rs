mod classifier;
mod config;
mod crawler;
mod error;
mod extractor;
mod fetcher;
mod frontier;
mod interrupt;
mod politeness;
mod state;
mod stats;
mod tracker;
mod traits;

pub use classifier::{is_excluded, is_in_scope, Classifier};
pub use config::{CrawlerConfig, Delay, DocumentHeuristic};
pub use crawler::{Crawler, Phase, SkipReason, TaskOutcome, Termination};
pub use error::{CrawlError, FetchError};
pub use extractor::{resolve_link, HtmlLinkExtractor};
pub use fetcher::HttpFetcher;
pub use frontier::{CrawlTask, Frontier};
pub use interrupt::Interrupt;
pub use politeness::Politeness;
pub use state::CrawlState;
pub use stats::{Statistics, StatsSnapshot};
pub use tracker::ClassificationTracker;
pub use traits::{
    InventorySink, LinkExtractor, LogProgress, NoProgress, PageFetcher, Progress, ProgressDisplay,
};

pub use async_trait::async_trait;
pub use url::Url;
