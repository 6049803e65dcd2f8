mod error;
mod inventory;
mod writer;

pub use error::PersistError;
pub use inventory::{Columns, CsvInventory, ReportConfig, Written};
pub use writer::{CsvFormat, Terminator};
