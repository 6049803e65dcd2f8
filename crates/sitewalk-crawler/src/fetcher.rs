use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use scraper::{Html, Selector};
use tokio::time::timeout;
use url::Url;

use crate::config::CrawlerConfig;
use crate::error::{CrawlError, FetchError};
use crate::traits::PageFetcher;

/// Plain HTTP fetcher, no script execution.
///
/// A page counts as ready when its markup holds an element matching the
/// configured ready selector.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Option<reqwest::Client>,
    timeout: Duration,
    ready_selector: String,
}

impl HttpFetcher {
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        if Selector::parse(&config.ready_selector).is_err() {
            return Err(CrawlError::Config(format!(
                "invalid ready selector {:?}",
                config.ready_selector
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );

        let timeout = config.fetch_timeout()?;
        let client = reqwest::ClientBuilder::new()
            .gzip(true)
            .deflate(true)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(CrawlError::driver_init)?;

        Ok(Self {
            client: Some(client),
            timeout,
            ready_selector: config.ready_selector.clone(),
        })
    }

    async fn download(client: &reqwest::Client, url: &Url) -> Result<String, FetchError> {
        let resp = client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&mut self, url: &Url) -> Result<String, FetchError> {
        let client = self.client.as_ref().ok_or(FetchError::Closed)?;

        let page = timeout(self.timeout, Self::download(client, url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        if is_ready(&page, &self.ready_selector) {
            Ok(page)
        } else {
            Err(FetchError::NotReady(self.ready_selector.clone()))
        }
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        if self.client.take().is_some() {
            log::debug!("HTTP fetcher closed");
        }
        Ok(())
    }
}

fn is_ready(page: &str, css: &str) -> bool {
    match Selector::parse(css) {
        Ok(selector) => Html::parse_document(page).select(&selector).next().is_some(),
        Err(_) => false,
    }
}
