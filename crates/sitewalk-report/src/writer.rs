use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvFormat {
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub terminator: Terminator,
    /// Quote every field instead of only those that need it
    #[serde(default)]
    pub quote_all: bool,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            terminator: Terminator::default(),
            quote_all: false,
        }
    }
}

fn default_delimiter() -> char {
    ','
}

impl CsvFormat {
    pub fn validate(&self) -> Result<(), PersistError> {
        if !self.delimiter.is_ascii() || self.delimiter == '"' {
            return Err(PersistError::InvalidFormat(format!(
                "delimiter {:?} must be a single ASCII character other than a quote",
                self.delimiter
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminator {
    #[default]
    LF,
    CRLF,
}

impl From<Terminator> for csv::Terminator {
    fn from(source: Terminator) -> Self {
        match source {
            Terminator::LF => Self::Any(b'\n'),
            Terminator::CRLF => Self::CRLF,
        }
    }
}

impl From<&CsvFormat> for csv::WriterBuilder {
    fn from(c: &CsvFormat) -> Self {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(c.delimiter as u8)
            .terminator(c.terminator.into())
            .double_quote(true)
            .quote_style(if c.quote_all {
                csv::QuoteStyle::Always
            } else {
                csv::QuoteStyle::Necessary
            });
        builder
    }
}

/// Writes `path` through a sibling `.partial` file renamed into place once
/// complete, so readers never see a half-written table.
pub(crate) fn write_table<F>(path: &Path, format: &CsvFormat, fill: F) -> Result<(), PersistError>
where
    F: FnOnce(&mut csv::Writer<fs_err::File>) -> csv::Result<()>,
{
    let partial = partial_path(path);
    let file = fs_err::File::create(&partial)?;
    let mut wtr = csv::WriterBuilder::from(format).from_writer(file);

    let written = fill(&mut wtr).and_then(|()| wtr.flush().map_err(csv::Error::from));
    drop(wtr);
    if let Err(source) = written {
        fs_err::remove_file(&partial).ok();
        return Err(PersistError::Csv {
            path: path.to_path_buf(),
            source,
        });
    }

    fs_err::rename(&partial, path)?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("inventory"));
    name.push(".partial");
    path.with_file_name(name)
}
