use std::collections::HashSet;

use serde::Serialize;
use url::Url;

use crate::classifier::Classifier;
use crate::config::CrawlerConfig;
use crate::error::{CrawlError, FetchError};
use crate::frontier::{CrawlTask, Frontier};
use crate::interrupt::Interrupt;
use crate::politeness::Politeness;
use crate::state::CrawlState;
use crate::traits::{InventorySink, LinkExtractor, PageFetcher, Progress, ProgressDisplay};

/// Lifecycle of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Running,
    Draining,
    Interrupted,
    Finalizing,
    Terminated,
}

/// How the crawl loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    Drained,
    Interrupted,
}

#[derive(Debug)]
pub enum TaskOutcome {
    Processed {
        children: usize,
        ending: bool,
        documents: usize,
    },
    Failed(FetchError),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyVisited,
    OutOfScope,
}

pub struct Crawler<F, X> {
    config: CrawlerConfig,
    seed: Url,
    classifier: Classifier,
    politeness: Politeness,
    fetcher: F,
    extractor: X,
    frontier: Frontier,
    state: CrawlState,
    phase: Phase,
}

impl<F, X> Crawler<F, X>
where
    F: PageFetcher,
    X: LinkExtractor,
{
    pub fn new(config: CrawlerConfig, fetcher: F, extractor: X) -> Result<Self, CrawlError> {
        config.validate()?;
        let seed = config.seed()?;
        let classifier = Classifier::new(&config.scope_url()?, &config.excluded_paths);
        let politeness = Politeness::new(&config.delay, config.delay_seed)?;

        Ok(Self {
            config,
            seed,
            classifier,
            politeness,
            fetcher,
            extractor,
            frontier: Frontier::new(),
            state: CrawlState::new(),
            phase: Phase::Idle,
        })
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Crawls until the frontier drains or `interrupt` fires, then persists
    /// through `sink` and releases the fetcher.
    ///
    /// Persistence and release happen on both endings. The crawl state stays
    /// readable afterwards, even when persisting failed.
    pub async fn run<S>(
        &mut self,
        interrupt: &Interrupt,
        progress: &mut dyn ProgressDisplay,
        sink: &S,
    ) -> Result<Termination, CrawlError>
    where
        S: InventorySink + ?Sized,
    {
        if self.phase != Phase::Idle {
            return Err(CrawlError::InvalidPhase(self.phase));
        }

        self.enter(Phase::Running);
        self.state.stats.start();
        self.frontier
            .push([CrawlTask::new(String::from(self.seed.clone()), 0)]);

        let termination = self.crawl(interrupt, progress).await;
        self.enter(match termination {
            Termination::Drained => Phase::Draining,
            Termination::Interrupted => Phase::Interrupted,
        });
        self.refresh(progress);

        self.enter(Phase::Finalizing);
        let persisted = sink.persist(&self.state).map_err(CrawlError::persistence);
        if let Err(e) = self.fetcher.close().await {
            log::warn!("Couldn't release page fetcher: {e}");
        }
        self.enter(Phase::Terminated);

        persisted?;
        Ok(termination)
    }

    async fn crawl(
        &mut self,
        interrupt: &Interrupt,
        progress: &mut dyn ProgressDisplay,
    ) -> Termination {
        loop {
            if interrupt.is_triggered() {
                return Termination::Interrupted;
            }
            let Some(task) = self.frontier.pop() else {
                return Termination::Drained;
            };

            let Some(outcome) = self.process(&task, interrupt).await else {
                log::info!("Abandoned {} on interrupt", task.url);
                return Termination::Interrupted;
            };

            match outcome {
                TaskOutcome::Processed {
                    children,
                    ending,
                    documents,
                } => {
                    log::debug!(
                        "Processed {} (depth {}): {children} new links, {documents} new documents{}",
                        task.url,
                        task.depth,
                        if ending { ", ending link" } else { "" }
                    );
                    if self.state.stats.urls_processed() % self.config.progress_interval == 0 {
                        self.refresh(progress);
                    }
                }
                TaskOutcome::Failed(e) => {
                    log::warn!("Skipping {} got: {e}", task.url);
                }
                TaskOutcome::Skipped(reason) => {
                    log::debug!("Skipping {} ({reason:?})", task.url);
                }
            }
        }
    }

    /// Handles one task, or returns `None` if interrupted before it settled
    async fn process(&mut self, task: &CrawlTask, interrupt: &Interrupt) -> Option<TaskOutcome> {
        if self.state.is_visited(&task.url) {
            return Some(TaskOutcome::Skipped(SkipReason::AlreadyVisited));
        }
        let url = match Url::parse(&task.url) {
            Ok(url) if self.classifier.admits(&url) => url,
            _ => return Some(TaskOutcome::Skipped(SkipReason::OutOfScope)),
        };

        let delay = self.politeness.next_delay();
        let fetcher = &mut self.fetcher;
        let fetched = tokio::select! {
            biased;
            _ = interrupt.triggered() => return None,
            fetched = async {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                fetcher.fetch(&url).await
            } => fetched,
        };

        let html = match fetched {
            Ok(html) => html,
            Err(e) => {
                self.state.record_failure(task, &e);
                return Some(TaskOutcome::Failed(e));
            }
        };

        self.state.mark_visited(task);

        let mut seen = HashSet::new();
        let children: Vec<CrawlTask> = self
            .extractor
            .extract_links(&html, &url)
            .into_iter()
            .filter(|link| {
                let admitted = self.classifier.admits(link);
                if !admitted {
                    log::trace!("Out of scope or excluded: {link}");
                }
                admitted
            })
            .map(String::from)
            .filter(|link| {
                !self.state.is_settled(link)
                    && !self.frontier.contains(link)
                    && seen.insert(link.clone())
            })
            .map(|link| task.child(link))
            .collect();

        self.state.stats.urls_found += children.len();
        self.state
            .tracker
            .record_children(&task.url, children.iter().map(|child| child.url.clone()));

        let ending = children.is_empty();
        if ending && self.config.track_ending_links && self.state.tracker.mark_ending(&task.url) {
            self.state.stats.ending_links_count += 1;
        }

        let mut documents = 0;
        if self.config.track_documents {
            let candidates = self
                .extractor
                .extract_document_candidates(&html, &url)
                .into_iter()
                .filter(|link| self.classifier.admits(link))
                .map(|link| (String::from(link), task.depth + 1));
            documents = self.state.tracker.add_documents(candidates);
            self.state.stats.document_urls_found += documents;
        }

        let count = children.len();
        self.frontier.push(children);

        Some(TaskOutcome::Processed {
            children: count,
            ending,
            documents,
        })
    }

    fn refresh(&self, progress: &mut dyn ProgressDisplay) {
        progress.refresh(&Progress {
            phase: self.phase,
            stats: self.state.stats.snapshot(),
            queue_len: self.frontier.len(),
            next: self.frontier.peek_tail(),
        });
    }

    fn enter(&mut self, phase: Phase) {
        log::info!("Crawl {:?} -> {phase:?}", self.phase);
        self.phase = phase;
    }
}
