use std::io::{self, Write};

use super::Channel;
use crate::data_types::record::LogRecord;

/// A channel writing records to the process console.
///
/// Records go straight to stderr, unbuffered.
#[derive(Debug, Default)]
pub struct ConsoleChannel;

impl Channel for ConsoleChannel {
    fn write_record(&self, record: &LogRecord) -> io::Result<usize> {
        let line = record.render();
        io::stderr().write_all(line.as_bytes())?;
        Ok(line.len())
    }

    fn flush(&self) -> io::Result<()> {
        io::stderr().flush()
    }
}
