use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

use crate::crawler::Phase;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failures that end a crawl, as opposed to per-page failures
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("couldn't start page fetcher: {0}")]
    DriverInit(#[source] BoxError),

    #[error("couldn't persist crawl inventory: {0}")]
    Persistence(#[source] BoxError),

    #[error("crawl cannot start from phase {0:?}")]
    InvalidPhase(Phase),
}

impl CrawlError {
    pub fn driver_init(e: impl Into<BoxError>) -> Self {
        Self::DriverInit(e.into())
    }

    pub fn persistence(e: impl Into<BoxError>) -> Self {
        Self::Persistence(e.into())
    }
}

/// A single page that couldn't be fetched, never fatal to the crawl
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(reqwest::StatusCode),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("page never exposed an element matching `{0}`")]
    NotReady(String),

    #[error("page fetcher already closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}
