mod progress;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::{env, io};

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use serde::Deserialize;
use sitewalk_crawler::{
    CrawlError, CrawlState, Crawler, CrawlerConfig, Delay, HtmlLinkExtractor, HttpFetcher,
    Interrupt, LinkExtractor, LogProgress, PageFetcher, ProgressDisplay, Termination,
};
use sitewalk_report::{Columns, CsvInventory, ReportConfig};
use tokio::runtime;

use crate::progress::ConsoleProgress;

const EXIT_PERSISTENCE: u8 = 1;
const EXIT_SETUP: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

/// Bounded-domain site crawler
#[derive(Debug, Parser)]
#[clap(version)]
pub struct Args {
    #[clap(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[clap(name = "crawl")]
    Crawl(CrawlArgs),
    #[clap(hide = true)]
    Completion,
}

/// Crawl every page of a site and write its URL inventory
#[derive(Debug, clap::Args)]
pub struct CrawlArgs {
    /// Starting URL, its origin bounds the crawl
    pub seed_url: Option<String>,
    /// Optional yaml configuration file with `crawler` and `report` sections
    #[clap(env = "SITEWALK_CONFIG", long, short)]
    pub config: Option<PathBuf>,
    /// Override the scope authority, defaults to the seed's origin
    #[clap(long)]
    pub scope: Option<String>,
    /// Extra path suffix to skip, may be repeated
    #[clap(long)]
    pub exclude: Vec<String>,
    /// Override the minimum politeness delay in seconds
    #[clap(long)]
    pub min_delay: Option<f32>,
    /// Override the maximum politeness delay in seconds
    #[clap(long)]
    pub max_delay: Option<f32>,
    /// Seed the delay generator for reproducible waits
    #[clap(long)]
    pub delay_seed: Option<u64>,
    /// Override the fetch timeout in seconds
    #[clap(long)]
    pub fetch_timeout: Option<f32>,
    /// CSS selector that must match before a page counts as ready
    #[clap(long)]
    pub ready_selector: Option<String>,
    /// Override the crawler's user agent
    #[clap(long)]
    pub user_agent: Option<String>,
    /// Refresh progress every N processed pages
    #[clap(long)]
    pub progress_interval: Option<usize>,
    /// Don't look for document links
    #[clap(long)]
    pub no_documents: bool,
    /// Don't record which pages are ending links
    #[clap(long)]
    pub no_ending_links: bool,
    /// Override the pattern matched against link text and ids
    #[clap(long)]
    pub document_text: Option<String>,
    /// Override the pattern matched against link targets
    #[clap(long)]
    pub document_href: Option<String>,
    /// Path of the URL inventory
    #[clap(long, short)]
    pub output: Option<PathBuf>,
    /// Path of the document URLs inventory
    #[clap(long)]
    pub documents_output: Option<PathBuf>,
    /// Log progress lines instead of redrawing a dashboard
    #[clap(long)]
    pub plain: bool,
    /// When quiet no logs are outputted
    #[clap(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    crawler: CrawlerConfig,
    #[serde(default)]
    report: ReportConfig,
}

impl TryFrom<&CrawlArgs> for (CrawlerConfig, ReportConfig) {
    type Error = anyhow::Error;

    fn try_from(args: &CrawlArgs) -> Result<Self, Self::Error> {
        let ConfigFile {
            crawler: mut conf,
            report: mut report,
        } = if let Some(path) = &args.config {
            let file = File::open(path)
                .with_context(|| format!("couldn't open config {}", path.display()))?;
            serde_yaml::from_reader(file)
                .with_context(|| format!("couldn't parse config {}", path.display()))?
        } else {
            ConfigFile::default()
        };

        if let Some(seed_url) = &args.seed_url {
            conf.seed_url = seed_url.to_string();
        }
        if conf.seed_url.is_empty() {
            anyhow::bail!("Missing seed URL, pass it as argument or as `seedUrl` in the config");
        }
        if let Some(scope) = &args.scope {
            conf.scope = Some(scope.to_string());
        }
        conf.excluded_paths.extend(args.exclude.iter().cloned());
        if args.min_delay.is_some() || args.max_delay.is_some() {
            conf.delay = Delay {
                min: args.min_delay.unwrap_or(conf.delay.min),
                max: args.max_delay.unwrap_or(conf.delay.max),
            };
        }
        if let Some(delay_seed) = args.delay_seed {
            conf.delay_seed = Some(delay_seed);
        }
        if let Some(fetch_timeout) = args.fetch_timeout {
            conf.fetch_timeout = fetch_timeout;
        }
        if let Some(ready_selector) = &args.ready_selector {
            conf.ready_selector = ready_selector.to_string();
        }
        if let Some(user_agent) = &args.user_agent {
            conf.user_agent = user_agent.to_string();
        }
        if let Some(progress_interval) = args.progress_interval {
            conf.progress_interval = progress_interval;
        }
        if args.no_documents {
            conf.track_documents = false;
        }
        if args.no_ending_links {
            conf.track_ending_links = false;
        }
        if let Some(pattern) = &args.document_text {
            conf.documents.text_pattern = pattern.to_string();
        }
        if let Some(pattern) = &args.document_href {
            conf.documents.href_pattern = pattern.to_string();
        }

        if let Some(output) = &args.output {
            report.inventory_file = output.clone();
        }
        if let Some(documents_output) = &args.documents_output {
            report.documents_file = documents_output.clone();
        }

        conf.validate()?;
        Ok((conf, report))
    }
}

pub fn crawl(args: CrawlArgs) -> anyhow::Result<ExitCode> {
    let (crawler_conf, report_conf): (CrawlerConfig, ReportConfig) = (&args).try_into()?;
    let inventory = CsvInventory::new(report_conf, Columns::from(&crawler_conf))?;
    let extractor = HtmlLinkExtractor::new(&crawler_conf.documents)?;
    let fetcher = HttpFetcher::new(&crawler_conf)?;

    let mut progress: Box<dyn ProgressDisplay> = if args.plain || args.quiet {
        Box::new(LogProgress)
    } else {
        Box::new(ConsoleProgress::new(&crawler_conf.seed_url))
    };
    let mut crawler = Crawler::new(crawler_conf, fetcher, extractor)?;

    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    let crawled = rt.block_on(async {
        let interrupt = Interrupt::new();
        interrupt.listen_ctrl_c();
        crawler.run(&interrupt, progress.as_mut(), &inventory).await
    });

    let termination = match crawled {
        Ok(termination) => termination,
        Err(CrawlError::Persistence(e)) => {
            log::error!("{e}");
            match save_fallback(&inventory, crawler.state()) {
                Ok(path) => eprintln!(
                    "Couldn't write the inventory, saved it to {} instead",
                    path.display()
                ),
                Err(e) => log::error!("Fallback inventory failed too: {e:#}"),
            }
            return Ok(ExitCode::from(EXIT_PERSISTENCE));
        }
        Err(e) => return Err(e.into()),
    };

    summarize(&crawler, &inventory);
    Ok(match termination {
        Termination::Drained => ExitCode::SUCCESS,
        Termination::Interrupted => ExitCode::from(EXIT_INTERRUPTED),
    })
}

/// Writes the inventory into a fresh temporary directory that outlives the process
fn save_fallback(inventory: &CsvInventory, state: &CrawlState) -> anyhow::Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix("sitewalk-")
        .tempdir()?
        .into_path();
    let written = inventory.relocated(&dir).write(state)?;
    Ok(written.inventory)
}

fn summarize<F, X>(crawler: &Crawler<F, X>, inventory: &CsvInventory)
where
    F: PageFetcher,
    X: LinkExtractor,
{
    let state = crawler.state();
    let stats = state.stats().snapshot();
    println!(
        "Crawled {} pages ({} failed, max depth {}) in {:.1}s",
        stats.urls_processed,
        stats.urls_failed,
        stats.max_depth,
        stats.elapsed.as_secs_f32()
    );
    println!("Inventory: {}", inventory.config().inventory_file.display());
    if crawler.config().track_ending_links {
        println!("Ending links: {}", state.tracker().ending_links_len());
    }
    if crawler.config().track_documents {
        println!(
            "Document URLs: {} ({})",
            state.tracker().document_urls_len(),
            inventory.config().documents_file.display()
        );
    }
    for (url, cause) in state.failed() {
        log::warn!("Failed {url}: {cause}");
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    match args.cmd {
        SubCommand::Crawl(args) => {
            if !args.quiet {
                if env::var_os("RUST_LOG").is_none() {
                    env::set_var(
                        "RUST_LOG",
                        "sitewalk=info,sitewalk_crawler=info,sitewalk_report=info",
                    );
                }
                env_logger::init();
            }
            match crawl(args) {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    ExitCode::from(EXIT_SETUP)
                }
            }
        }
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "sitewalk", &mut io::stdout());
            ExitCode::SUCCESS
        }
    }
}
