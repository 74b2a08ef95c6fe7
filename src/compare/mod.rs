//! The comparison engine.
//!
//! A [`Diff`] captures both table lists once, then runs its comparators in a
//! fixed order against the same sink. Every atomic check emits exactly one
//! [`DiffRecord`]; mismatches are records, never errors.

use async_trait::async_trait;

use crate::{
    db::SchemaProvider,
    errors::{DbError, DiffError},
    models::{diff::DiffRecord, schema::SchemaSnapshot},
    output::{CollectingOutput, Output},
};

mod columns;
mod foreign_keys;
mod indexes;
pub mod table_names;
pub mod table_structure;

pub use columns::defaults_equal;
pub use table_names::{check_table_sets, compare_table_sets, TableNames};
pub use table_structure::{compare_table_structures, diff_table, TablePair, TableStructure};

/// Both providers plus the table lists captured from them for this run.
pub struct DiffContext<'a> {
    pub primary: &'a dyn SchemaProvider,
    pub comparison: &'a dyn SchemaProvider,
    pub primary_snapshot: SchemaSnapshot,
    pub comparison_snapshot: SchemaSnapshot,
    /// Tables both sides list, in the primary's order.
    pub common_tables: Vec<String>,
}

impl<'a> DiffContext<'a> {
    pub async fn capture(
        primary: &'a dyn SchemaProvider,
        comparison: &'a dyn SchemaProvider,
    ) -> Result<Self, DbError> {
        let primary_snapshot = SchemaSnapshot::capture(primary).await?;
        log::info!(
            "Captured {} tables from {}",
            primary_snapshot.tables.len(),
            primary_snapshot.database_name
        );

        let comparison_snapshot = SchemaSnapshot::capture(comparison).await?;
        log::info!(
            "Captured {} tables from {}",
            comparison_snapshot.tables.len(),
            comparison_snapshot.database_name
        );

        let common_tables = primary_snapshot.common_tables(&comparison_snapshot);
        log::debug!("{} tables in common", common_tables.len());

        Ok(Self {
            primary,
            comparison,
            primary_snapshot,
            comparison_snapshot,
            common_tables,
        })
    }
}

/// One step of a comparison run.
#[async_trait]
pub trait Comparator: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, ctx: &DiffContext<'_>, output: &mut dyn Output) -> Result<(), DiffError>;
}

/// Runs the comparators in order against one pair of databases.
pub struct Diff {
    comparators: Vec<Box<dyn Comparator>>,
}

impl Default for Diff {
    fn default() -> Self {
        Self::new()
    }
}

impl Diff {
    /// Table names first, then the structure of the tables both sides have.
    pub fn new() -> Self {
        Self::with_comparators(vec![Box::new(TableNames), Box::new(TableStructure)])
    }

    pub fn with_comparators(comparators: Vec<Box<dyn Comparator>>) -> Self {
        Diff { comparators }
    }

    pub async fn run(
        &self,
        primary: &dyn SchemaProvider,
        comparison: &dyn SchemaProvider,
        output: &mut dyn Output,
    ) -> Result<(), DiffError> {
        let ctx = DiffContext::capture(primary, comparison).await?;

        for comparator in &self.comparators {
            log::info!("Running {} comparison", comparator.name());
            comparator.run(&ctx, output).await?;
        }

        output.flush()?;
        Ok(())
    }
}

/// Compare two databases and collect every record in emission order.
pub async fn diff(
    primary: &dyn SchemaProvider,
    comparison: &dyn SchemaProvider,
) -> Result<Vec<DiffRecord>, DiffError> {
    let mut output = CollectingOutput::new();
    Diff::new().run(primary, comparison, &mut output).await?;

    let records = output.into_records();
    log::info!(
        "{} of {} checks failed",
        records.iter().filter(|r| !r.passed).count(),
        records.len()
    );
    Ok(records)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{
        diff::RecordScope,
        schema::{Platform, TableDescriptor},
    };

    use super::TablePair;

    /// `users` compared between `db1` and `db2`, both MySQL.
    pub(crate) fn pair<'a>(
        primary: &'a TableDescriptor,
        comparison: &'a TableDescriptor,
    ) -> TablePair<'a> {
        TablePair {
            scope: RecordScope::new("db1", "users"),
            comparison_database: "db2",
            primary_platform: Platform::MySql,
            comparison_platform: Platform::MySql,
            primary,
            comparison,
        }
    }
}
