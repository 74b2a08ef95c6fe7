//! Sinks that consume diff records as the comparators emit them.

use crate::{errors::OutputError, models::diff::DiffRecord};

mod collect;
mod console;
mod counting;
mod csv_report;
mod json_lines;

pub use collect::CollectingOutput;
pub use console::ConsoleOutput;
pub use counting::CountingOutput;
pub use csv_report::CsvOutput;
pub use json_lines::JsonOutput;

/// Receives every diff record, once, in emission order.
///
/// An error aborts the comparison run.
pub trait Output: Send {
    fn write(&mut self, record: &DiffRecord) -> Result<(), OutputError>;

    /// Called once after the last record of a run.
    fn flush(&mut self) -> Result<(), OutputError> {
        Ok(())
    }
}

impl<O: Output + ?Sized> Output for Box<O> {
    fn write(&mut self, record: &DiffRecord) -> Result<(), OutputError> {
        (**self).write(record)
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        (**self).flush()
    }
}
