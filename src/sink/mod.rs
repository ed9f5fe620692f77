//! Output sinks: where flattened rows end up.

#[cfg(feature = "tempfile")]
pub mod csv;
pub mod memory;

#[cfg(feature = "tempfile")]
pub use csv::CsvDirectorySink;
pub use memory::MemorySink;

use std::io;

/// Receives rows, including header rows, one at a time per output group.
pub trait OutputSink {
    fn write_record(&mut self, group: &str, row: &[String]) -> io::Result<()>;

    /// Called once after every record of a successful run has been written.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_record(&mut self, group: &str, row: &[String]) -> io::Result<()> {
        (**self).write_record(group, row)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}
