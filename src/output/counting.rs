use crate::{errors::OutputError, models::diff::DiffRecord};

use super::Output;

/// Forwards to another sink while counting passes and failures.
pub struct CountingOutput<O: Output> {
    inner: O,
    passed: usize,
    failed: usize,
}

impl<O: Output> CountingOutput<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            passed: 0,
            failed: 0,
        }
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<O: Output> Output for CountingOutput<O> {
    fn write(&mut self, record: &DiffRecord) -> Result<(), OutputError> {
        self.inner.write(record)?;
        if record.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        self.inner.flush()
    }
}
