use crate::{errors::OutputError, models::diff::DiffRecord};

use super::Output;

/// Keeps every record in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectingOutput {
    records: Vec<DiffRecord>,
}

impl CollectingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[DiffRecord] {
        &self.records
    }

    pub fn failures(&self) -> impl Iterator<Item = &DiffRecord> {
        self.records.iter().filter(|record| !record.passed)
    }

    pub fn into_records(self) -> Vec<DiffRecord> {
        self.records
    }
}

impl Output for CollectingOutput {
    fn write(&mut self, record: &DiffRecord) -> Result<(), OutputError> {
        self.records.push(record.clone());
        Ok(())
    }
}
