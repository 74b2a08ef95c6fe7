use std::io::Write;

use crate::{errors::OutputError, models::diff::DiffRecord};

use super::Output;

/// Human readable report. Passing records are skipped unless `show_passed`.
pub struct ConsoleOutput<W: Write + Send> {
    writer: W,
    show_passed: bool,
}

impl<W: Write + Send> ConsoleOutput<W> {
    pub fn new(writer: W, show_passed: bool) -> Self {
        Self {
            writer,
            show_passed,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Output for ConsoleOutput<W> {
    fn write(&mut self, record: &DiffRecord) -> Result<(), OutputError> {
        if record.passed && !self.show_passed {
            return Ok(());
        }

        let mut location = format!("{}.{}", record.database, record.table);
        if let Some(column) = &record.column {
            location.push('.');
            location.push_str(column);
        }
        let kind = match record.field {
            Some(field) => format!("{}:{}", record.diff_type, field),
            None => record.diff_type.to_string(),
        };
        let status = if record.passed { "PASS" } else { "FAIL" };

        writeln!(self.writer, "{} [{}] [{}]", status, location, kind)?;
        if let Some(message) = &record.message {
            writeln!(self.writer, "    {}", message)?;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}
