use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sitewalk_crawler::{CrawlState, CrawlerConfig, InventorySink};

use crate::error::PersistError;
use crate::writer::{write_table, CsvFormat};

const URL: &str = "URL";
const DEPTH: &str = "Depth";
const IS_ENDING_LINK: &str = "Is Ending Link";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(default = "default_inventory_file")]
    pub inventory_file: PathBuf,
    #[serde(default = "default_documents_file")]
    pub documents_file: PathBuf,
    #[serde(default)]
    pub csv: CsvFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            inventory_file: default_inventory_file(),
            documents_file: default_documents_file(),
            csv: CsvFormat::default(),
        }
    }
}

fn default_inventory_file() -> PathBuf {
    PathBuf::from("urls.csv")
}

fn default_documents_file() -> PathBuf {
    PathBuf::from("document_urls.csv")
}

/// Which optional columns and tables an inventory carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub ending_links: bool,
    pub documents: bool,
}

impl From<&CrawlerConfig> for Columns {
    fn from(c: &CrawlerConfig) -> Self {
        Self {
            ending_links: c.track_ending_links,
            documents: c.track_documents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub inventory: PathBuf,
    pub pages: usize,
    pub documents: Option<(PathBuf, usize)>,
}

/// Crawl inventory as CSV: visited pages, and optionally document URLs,
/// each sorted by URL.
#[derive(Debug, Clone)]
pub struct CsvInventory {
    config: ReportConfig,
    columns: Columns,
}

impl CsvInventory {
    pub fn new(config: ReportConfig, columns: Columns) -> Result<Self, PersistError> {
        config.csv.validate()?;
        Ok(Self { config, columns })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Same inventory with both files moved into `dir`
    pub fn relocated(&self, dir: &Path) -> Self {
        let rebase = |file: &Path| dir.join(file.file_name().unwrap_or(file.as_os_str()));
        Self {
            config: ReportConfig {
                inventory_file: rebase(&self.config.inventory_file),
                documents_file: rebase(&self.config.documents_file),
                csv: self.config.csv.clone(),
            },
            columns: self.columns,
        }
    }

    pub fn write(&self, state: &CrawlState) -> Result<Written, PersistError> {
        let inventory = &self.config.inventory_file;
        let ending_links = self.columns.ending_links;
        write_table(inventory, &self.config.csv, |wtr| {
            if ending_links {
                wtr.write_record([URL, DEPTH, IS_ENDING_LINK])?;
            } else {
                wtr.write_record([URL, DEPTH])?;
            }
            for (url, depth) in state.visited() {
                let depth = depth.to_string();
                if ending_links {
                    let ending = title_case(state.tracker().is_ending_link(url));
                    wtr.write_record([url, depth.as_str(), ending])?;
                } else {
                    wtr.write_record([url, depth.as_str()])?;
                }
            }
            Ok(())
        })?;

        let documents = if self.columns.documents {
            let path = &self.config.documents_file;
            write_table(path, &self.config.csv, |wtr| {
                wtr.write_record([URL, DEPTH])?;
                for (url, found_at) in state.tracker().document_urls() {
                    let depth = state.depth_of(url).unwrap_or(found_at).to_string();
                    wtr.write_record([url, depth.as_str()])?;
                }
                Ok(())
            })?;
            Some((path.clone(), state.tracker().document_urls_len()))
        } else {
            None
        };

        Ok(Written {
            inventory: inventory.clone(),
            pages: state.visited_len(),
            documents,
        })
    }
}

impl InventorySink for CsvInventory {
    type Error = PersistError;

    fn persist(&self, state: &CrawlState) -> Result<(), Self::Error> {
        let written = self.write(state)?;
        log::info!(
            "Wrote {} pages to {}",
            written.pages,
            written.inventory.display()
        );
        if let Some((path, count)) = written.documents {
            log::info!("Wrote {count} document URLs to {}", path.display());
        }
        Ok(())
    }
}

fn title_case(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}
