use std::io::Write;

use crate::{errors::OutputError, models::diff::DiffRecord};

use super::Output;

/// One JSON object per record, newline separated.
pub struct JsonOutput<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> JsonOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Output for JsonOutput<W> {
    fn write(&mut self, record: &DiffRecord) -> Result<(), OutputError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}
